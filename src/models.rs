// ABOUTME: Re-exports the domain models from fitcoach-core
// ABOUTME: Documents, validated trees, tagged outcomes, profiles and nutrition estimates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use fitcoach_core::models::*;
