//! Housing carrying costs built on the amortization engine. Tax and
//! insurance rates arrive from outside as plain numbers.

pub mod all_in;
