pub(crate) mod bookings;
pub(crate) mod catalog;
pub(crate) mod events;
pub(crate) mod teams;
pub(crate) mod users;
