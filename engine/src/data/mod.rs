// Market data access: CSV parsing and the bar source used by the analysis pass
pub mod csv_parser;
pub mod market_data;
