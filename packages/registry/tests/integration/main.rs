mod support;

mod download;
mod persistence;
mod restore;
