#![cfg(test)]


mod test_engine;
