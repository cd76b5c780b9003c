pub mod add;
pub mod classify;
pub mod mix;
pub mod serve;
pub mod subjects;
