// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale trainer: a terminal piano keyboard that judges every note against
//! a major or natural minor scale.

pub mod audio;
pub mod config;
pub mod control;
pub mod midi;
pub mod music;
pub mod practice;
pub mod trainer;
pub mod ui;
