#![cfg(test)]

mod catalog;
