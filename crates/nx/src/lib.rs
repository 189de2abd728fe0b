//! Command line front end for [`nx_pkg`]

pub mod commands;
