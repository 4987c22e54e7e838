//! Category registry for one counting session.
//!
//! Base categories are fixed at process start and always come first, in the
//! order of [`BASE_CATEGORIES`]. Ad hoc categories are registered by the
//! operator during the session and follow in registration order. A name lives
//! in exactly one of the two sets and can never be removed.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, util::normalize_required_name};

/// Vehicle categories every ledger starts with.
pub const BASE_CATEGORIES: [&str; 17] = [
    "Autos",
    "Camionetas",
    "Micro Bus",
    "Mini Bus",
    "Bus",
    "Omnibus",
    "Camiones de 1 Eje",
    "Camiones de 2 Ejes",
    "Camiones 3 Ejes o más",
    "Motos",
    "Jeeps",
    "Bicicletas",
    "Peatones",
    "V.A",
    "V.C",
    "Tracción Animal",
    "Rickshaw",
];

/// Label of the synthetic aggregate row holding the sum of all the others.
/// Reserved: it can't be registered as a category.
pub const TOTAL_ROW_NAME: &str = "N° Vehículos";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOrigin {
    Base,
    AdHoc,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub origin: CategoryOrigin,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRegistry {
    ad_hoc: Vec<String>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self { ad_hoc: Vec::new() }
    }

    /// Register an ad hoc category.
    ///
    /// The name is trimmed first; blank names fail with
    /// [`EngineError::EmptyName`], names matching a base category, an
    /// existing ad hoc category or [`TOTAL_ROW_NAME`] fail with
    /// [`EngineError::AlreadyExists`].
    pub fn register(&mut self, name: &str) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category name")?;
        if name == TOTAL_ROW_NAME || self.contains(&name) {
            return Err(EngineError::AlreadyExists(name));
        }

        self.ad_hoc.push(name.clone());
        Ok(Category {
            name,
            origin: CategoryOrigin::AdHoc,
        })
    }

    pub fn get(&self, name: &str) -> Option<Category> {
        if BASE_CATEGORIES.contains(&name) {
            return Some(Category {
                name: name.to_string(),
                origin: CategoryOrigin::Base,
            });
        }
        self.ad_hoc.iter().find(|c| *c == name).map(|c| Category {
            name: c.clone(),
            origin: CategoryOrigin::AdHoc,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        BASE_CATEGORIES.contains(&name) || self.ad_hoc.iter().any(|c| c == name)
    }

    /// Every category, base first.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        let base = BASE_CATEGORIES.iter().map(|name| Category {
            name: name.to_string(),
            origin: CategoryOrigin::Base,
        });
        let ad_hoc = self.ad_hoc.iter().map(|name| Category {
            name: name.clone(),
            origin: CategoryOrigin::AdHoc,
        });
        base.chain(ad_hoc)
    }
}
