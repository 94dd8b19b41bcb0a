//! Confidence intervals for empirical quantiles
//!
//! The analytic order-statistic interval needs no resampling and is the
//! cheap alternative to the bootstrap when building q-q maps.

mod order_statistic;

pub use order_statistic::{
    order_statistic_indices, order_statistic_interval, sigma_for_confidence, DEFAULT_SIGMA,
};
