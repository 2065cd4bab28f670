//! Unit and behaviour tests for the alb-cloudlets crate.

mod associations;
mod support;
