pub mod decklists;
pub mod meta;
pub mod prices;
pub mod similar;
