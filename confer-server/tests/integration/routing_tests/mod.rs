mod test_unicast_signals;
