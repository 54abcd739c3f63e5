// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::client::RegistryClient;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<RegistryClient>,
}

impl AppState {
    pub fn new(client: RegistryClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}
