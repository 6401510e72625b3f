// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::DrugId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabKind {
    Register,
    Search,
}

impl TabKind {
    pub const ALL: [Self; 2] = [Self::Register, Self::Search];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Search => "search",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "register" => Some(Self::Register),
            "search" => Some(Self::Search),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Category,
    Description,
    Interactions,
}

impl FormField {
    pub const ALL: [Self; 4] = [
        Self::Name,
        Self::Category,
        Self::Description,
        Self::Interactions,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::Description => "description",
            Self::Interactions => "interactions",
        }
    }

    pub const fn required(self) -> bool {
        !matches!(self, Self::Interactions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drug {
    pub id: DrugId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub interactions: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
