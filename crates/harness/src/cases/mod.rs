// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The bundled benchmark cases, bottom of the stack first.

mod defrag_case;
mod frag_case;
mod memcpy_case;
mod msgq_case;

pub use defrag_case::DefragCase;
pub use frag_case::FragCase;
pub use memcpy_case::MemcpyCase;
pub use msgq_case::MsgqCase;
