mod filter;
mod ops;
