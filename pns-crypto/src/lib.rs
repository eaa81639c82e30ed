pub mod address;
pub mod hash;
pub mod namehash;
