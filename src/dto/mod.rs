//! Wire-level message contract for the microcontroller link.

pub mod inbound;
pub mod outbound;

pub use inbound::LinkCommand;
pub use outbound::order_line;
