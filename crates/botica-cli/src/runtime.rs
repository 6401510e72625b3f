// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use botica_app::{Drug, DrugFormInput, DrugId};
use botica_db::{NewDrug, Store};

pub struct DbRuntime<'a> {
    store: &'a Store,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }
}

impl botica_tui::AppRuntime for DbRuntime<'_> {
    fn save_drug(&mut self, form: &DrugFormInput) -> Result<DrugId> {
        form.validate()?;
        self.store.insert_drug(&NewDrug {
            name: form.name.clone(),
            description: form.description.clone(),
            category: form.category.clone(),
            interactions: form.interactions_or_none(),
        })
    }

    fn search_drugs(&mut self, filter: &str) -> Result<Vec<Drug>> {
        self.store.search_drugs(filter)
    }
}
