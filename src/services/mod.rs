pub mod cdc;
