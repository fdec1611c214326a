pub mod account;
pub mod band_data;
pub mod log_entry;
pub mod order;
pub mod position;
pub mod program_state;
pub mod quote_data;
pub mod service_status;
pub mod setting;

pub use account::Account;
pub use band_data::BandData;
pub use log_entry::{LogEntry, LogLevel};
pub use order::{Order, OrderSide, OrderStatus, OrderType};
pub use position::Position;
pub use program_state::ProgramState;
pub use quote_data::QuoteData;
pub use service_status::ServiceStatus;
pub use setting::{Setting, SettingType};
