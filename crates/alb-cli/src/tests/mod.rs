//! Unit and behaviour tests for the alb CLI runtime.

mod support;
