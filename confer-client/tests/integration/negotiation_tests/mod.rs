mod test_initiate;
mod test_inbound_offer;
