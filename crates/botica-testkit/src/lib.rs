// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use std::path::PathBuf;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoDrug {
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub interactions: Option<&'static str>,
}

pub const DEMO_DRUGS: [DemoDrug; 12] = [
    DemoDrug {
        name: "Ibuprofeno",
        description: "Antiinflamatorio no esteroideo para dolor y fiebre",
        category: "AINE",
        interactions: Some("Potencia el efecto de anticoagulantes orales"),
    },
    DemoDrug {
        name: "Paracetamol",
        description: "Analgésico y antipirético de uso general",
        category: "Analgésico",
        interactions: None,
    },
    DemoDrug {
        name: "Amoxicilina",
        description: "Antibiótico betalactámico de amplio espectro",
        category: "Antibiótico",
        interactions: Some("Reduce la eficacia de anticonceptivos orales"),
    },
    DemoDrug {
        name: "Omeprazol",
        description: "Inhibidor de la bomba de protones para reflujo y úlcera",
        category: "Antiulceroso",
        interactions: Some("Disminuye la absorción de ketoconazol"),
    },
    DemoDrug {
        name: "Loratadina",
        description: "Antihistamínico de segunda generación sin efecto sedante",
        category: "Antihistamínico",
        interactions: None,
    },
    DemoDrug {
        name: "Metformina",
        description: "Antidiabético oral que reduce la producción hepática de glucosa",
        category: "Antidiabético",
        interactions: Some("El alcohol aumenta el riesgo de acidosis láctica"),
    },
    DemoDrug {
        name: "Atorvastatina",
        description: "Reduce el colesterol LDL inhibiendo la HMG-CoA reductasa",
        category: "Hipolipemiante",
        interactions: Some("El zumo de pomelo eleva su concentración plasmática"),
    },
    DemoDrug {
        name: "Salbutamol",
        description: "Broncodilatador de acción corta para crisis de asma",
        category: "Broncodilatador",
        interactions: None,
    },
    DemoDrug {
        name: "Enalapril",
        description: "Inhibidor de la ECA para hipertensión arterial",
        category: "Antihipertensivo",
        interactions: Some("Con diuréticos ahorradores de potasio causa hiperpotasemia"),
    },
    DemoDrug {
        name: "Diclofenaco",
        description: "Antiinflamatorio para dolor musculoesquelético",
        category: "AINE",
        interactions: Some("Aumenta la toxicidad del litio"),
    },
    DemoDrug {
        name: "Azitromicina",
        description: "Antibiótico macrólido de dosis única diaria",
        category: "Antibiótico",
        interactions: None,
    },
    DemoDrug {
        name: "Naproxeno",
        description: "Antiinflamatorio de acción prolongada",
        category: "AINE",
        interactions: Some("Evitar junto a otros AINE por riesgo digestivo"),
    },
];

const DOSE_STRENGTHS_MG: [u32; 7] = [100, 200, 250, 400, 500, 600, 850];

const DOSE_FORMS: [&str; 4] = ["comprimidos", "cápsulas", "jarabe", "suspensión"];

pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0x9E37_79B9_7F4A_7C15;
        }
        Self { state }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let mut value = self.state;
        value ^= value >> 13;
        value ^= value << 7;
        value ^= value >> 17;
        value
    }

    pub fn int_n(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.next_u64() % bound
    }

    pub fn bool(&mut self) -> bool {
        self.next_u64() & 1 == 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoDrugRecord {
    pub name: String,
    pub description: String,
    pub category: String,
    pub interactions: Option<String>,
}

pub struct PharmaFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl PharmaFaker {
    pub fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn drug(&mut self) -> DemoDrugRecord {
        let base = &DEMO_DRUGS[self.rng.int_n(DEMO_DRUGS.len() as u64) as usize];
        let name = if self.rng.bool() {
            let strength = DOSE_STRENGTHS_MG[self.rng.int_n(DOSE_STRENGTHS_MG.len() as u64) as usize];
            let form = DOSE_FORMS[self.rng.int_n(DOSE_FORMS.len() as u64) as usize];
            format!("{} {strength} mg {form}", base.name)
        } else {
            base.name.to_owned()
        };
        DemoDrugRecord {
            name,
            description: base.description.to_owned(),
            category: base.category.to_owned(),
            interactions: base.interactions.map(str::to_owned),
        }
    }
}

pub fn seed_demo_drugs(conn: &Connection, seed: u64, count: usize) -> Result<usize> {
    let mut faker = PharmaFaker::new(seed);
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format seed timestamp")?;
    let mut inserted = 0;
    for _ in 0..count {
        let drug = faker.drug();
        conn.execute(
            "
            INSERT INTO drugs (name, description, category, interactions, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                drug.name,
                drug.description,
                drug.category,
                drug.interactions,
                now,
                now
            ],
        )
        .context("insert demo drug")?;
        inserted += 1;
    }
    Ok(inserted)
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("botica.db");
    Ok((dir, path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}
