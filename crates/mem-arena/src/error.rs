// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the bump arena.

/// Errors that can occur while creating or allocating from a [`BumpArena`].
///
/// [`BumpArena`]: crate::BumpArena
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// The requested allocation does not fit in the remaining capacity.
    #[error("arena exhausted: requested {requested_bytes} bytes (aligned {aligned_bytes}), but only {available_bytes} remain of {capacity_bytes}")]
    Exhausted {
        requested_bytes: usize,
        aligned_bytes: usize,
        available_bytes: usize,
        capacity_bytes: usize,
    },

    /// Attempted to allocate a zero-sized region.
    #[error("cannot allocate a zero-sized region")]
    ZeroSizedAllocation,

    /// The arena was created with a capacity too small to be useful.
    #[error("arena capacity {capacity} is below the {minimum}-byte minimum")]
    CapacityTooSmall { capacity: usize, minimum: usize },
}
