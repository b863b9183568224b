pub mod counter;
pub mod fine;
pub mod loan;
pub mod notification;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod product;
pub mod refund;
pub mod supplier;
pub mod ticket;
pub mod ticket_response;
pub mod user;
pub mod wallet;
