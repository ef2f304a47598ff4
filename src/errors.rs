//! Error Types
//!
//! This module defines the error type used throughout the crate.
//!
//! # Overview
//!
//! [`ShadowLabError`] distinguishes three classes of failure:
//! - Device/context initialization failures, which are fatal and abort startup
//! - Resource-setup failures (a light-space target that cannot be created),
//!   which are logged while the frame proceeds with undefined shadow content
//! - Invalid shadow parameters (cascade ranges, SAT ping-pong parity)
//!
//! All fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, ShadowLabError>`.

use thiserror::Error;

/// The main error type for Shadow Lab.
#[derive(Error, Debug)]
pub enum ShadowLabError {
    // ========================================================================
    // Device & Window Errors (fatal)
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create the presentation surface.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    /// Window creation error (winit).
    #[error("Window creation failed: {0}")]
    WindowCreateFailed(#[from] winit::error::OsError),

    // ========================================================================
    // Resource Setup Errors (logged, non-fatal)
    // ========================================================================
    /// A light-space render target cannot be created on this device.
    #[error("{label} setup error: {reason}")]
    IncompleteRenderTarget {
        /// Debug label of the target
        label: &'static str,
        /// Which device limit or format capability is missing
        reason: String,
    },

    // ========================================================================
    // Shadow Parameter Errors
    // ========================================================================
    /// The cascade depth range or count cannot produce an ordered split.
    #[error("Invalid cascade range: near={near}, far={far}, count={count}")]
    InvalidCascadeRange {
        /// Near plane distance
        near: f32,
        /// Far plane distance
        far: f32,
        /// Requested number of slices
        count: usize,
    },

    /// The log/uniform blend weight is outside `[0, 1]`.
    #[error("Cascade split weight must lie in [0, 1], got {0}")]
    InvalidSplitWeight(f32),

    /// The summed-area table did not end in the front buffer.
    #[error("Summed-area table ended in slot {slot} after {swaps} swaps")]
    SatParityMismatch {
        /// Number of ping-pong swaps performed
        swaps: u32,
        /// Slot currently holding the result
        slot: usize,
    },

    /// Settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// Alias for `Result<T, ShadowLabError>`.
pub type Result<T> = std::result::Result<T, ShadowLabError>;
