// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixtures for handler and router tests.

use std::collections::BTreeSet;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
};
use chrono::Utc;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{
    auth::{
        extractor::test_support::{mint_token, test_auth_config, TEST_SECRET},
        AuthenticatedUser, Role,
    },
    state::AppState,
    storage::{
        FileStorage, GroupRepository, SourceRepository, StoragePaths, StoredGroup, StoredSource,
        StoredUser, UserRepository,
    },
};

pub struct TestApp {
    state: AppState,
    _temp: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let mut storage = FileStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().expect("Failed to initialize storage");
        Self {
            state: AppState::new(storage).with_auth_config(test_auth_config()),
            _temp: temp,
        }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Ensure a group exists; returns its id.
    pub async fn group(&self, id: &str) -> String {
        let storage = self.state.storage.write().await;
        let groups = GroupRepository::new(&storage);
        if !groups.exists(id) {
            groups
                .create(&StoredGroup {
                    id: id.to_string(),
                    name: id.to_string(),
                    member_ids: BTreeSet::new(),
                    admin_ids: BTreeSet::new(),
                    created_at: Utc::now(),
                })
                .unwrap();
        }
        id.to_string()
    }

    /// Register a user as a member of `groups`, creating missing groups.
    pub async fn user(&self, id: &str, role: Role, groups: &[&str]) -> AuthenticatedUser {
        for group in groups {
            self.group(group).await;
        }

        let storage = self.state.storage.write().await;
        let stored = StoredUser {
            id: id.to_string(),
            username: id.to_string(),
            acls: role.acls(),
            created_at: Utc::now(),
        };
        UserRepository::new(&storage).create(&stored).unwrap();

        let repo = GroupRepository::new(&storage);
        for group in groups {
            let mut record = repo.get(group).unwrap();
            record.member_ids.insert(id.to_string());
            repo.update(&record).unwrap();
        }

        let group_ids = repo.ids_for_member(id).unwrap();
        AuthenticatedUser::from_stored(stored, group_ids, 0)
    }

    pub async fn source(&self, id: &str, groups: &[&str]) {
        for group in groups {
            self.group(group).await;
        }
        let storage = self.state.storage.write().await;
        SourceRepository::new(&storage)
            .create(&StoredSource {
                id: id.to_string(),
                ra: Some(210.91),
                dec: Some(54.31),
                group_ids: groups.iter().map(|g| g.to_string()).collect(),
                created_by: "fixture".to_string(),
                created_at: Utc::now(),
            })
            .unwrap();
    }

    pub async fn source_groups(&self, id: &str) -> BTreeSet<String> {
        let storage = self.state.storage.read().await;
        SourceRepository::new(&storage).get(id).unwrap().group_ids
    }

    /// Send a request through the full router as `user_id`.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(body) => {
                self.send(method, uri, user_id, Some("application/json"), body.to_string())
                    .await
            }
            None => self.send(method, uri, user_id, None, String::new()).await,
        }
    }

    /// Send a raw body with an optional `Content-Type`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<&str>,
        content_type: Option<&str>,
        body: String,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            let token = mint_token(user_id, TEST_SECRET, 3600);
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        let request = builder.body(Body::from(body)).unwrap();

        let response = crate::api::router(self.state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
