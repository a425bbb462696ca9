// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

//! Integration test package; the tests live under `tests/`.
