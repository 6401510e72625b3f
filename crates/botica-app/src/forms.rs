// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::FormField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingName,
    MissingDescription,
    MissingCategory,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => f.write_str("drug name is required"),
            Self::MissingDescription => f.write_str("description is required"),
            Self::MissingCategory => f.write_str("category is required"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrugFormInput {
    pub name: String,
    pub category: String,
    pub description: String,
    pub interactions: String,
}

impl DrugFormInput {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        Ok(())
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Category => &self.category,
            FormField::Description => &self.description,
            FormField::Interactions => &self.interactions,
        }
    }

    pub fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Category => &mut self.category,
            FormField::Description => &mut self.description,
            FormField::Interactions => &mut self.interactions,
        }
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.category.clear();
        self.description.clear();
        self.interactions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.category.is_empty()
            && self.description.is_empty()
            && self.interactions.is_empty()
    }

    // Blank interactions become NULL in storage instead of an empty string.
    pub fn interactions_or_none(&self) -> Option<String> {
        if self.interactions.trim().is_empty() {
            None
        } else {
            Some(self.interactions.clone())
        }
    }
}
