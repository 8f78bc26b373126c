mod helpers;
mod intake;
mod mocks;
mod orders;
