//! Exhibition and sponsorship package domain model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::entity::{EditorScope, Entity, ManagedEntity, Messages};
use crate::services::gateway::{Filter, OrderBy};

/// Which public page a package belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Exhibitor,
    Sponsor,
}

impl PackageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::Exhibitor => "exhibitor",
            PackageType::Sponsor => "sponsor",
        }
    }
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PackageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exhibitor" => Ok(PackageType::Exhibitor),
            "sponsor" => Ok(PackageType::Sponsor),
            other => Err(format!("Unknown package type: {}", other)),
        }
    }
}

/// A priced package shown on the exhibitors or sponsors page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    pub package_type: PackageType,
    pub name: String,
    /// Display string, e.g. `"EGP 25,000"`.
    pub price: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Package {
    pub fn scope() -> EditorScope {
        EditorScope::new(Messages {
            load_failed: "Failed to load packages",
            save_failed: "Failed to update package",
            saved: "Package updated successfully",
            create_failed: "Failed to create package",
            created: "Package created successfully",
            delete_failed: "Failed to delete package",
            deleted: "Package deleted successfully",
        })
        .order(OrderBy::asc("display_order"))
    }

    /// Active packages of one type, as listed on the public pages.
    pub fn public_scope(package_type: Option<PackageType>) -> EditorScope {
        let mut scope = Self::scope().filter(Filter::eq("is_active", "true"));
        if let Some(package_type) = package_type {
            scope = scope.filter(Filter::eq("package_type", package_type.as_str()));
        }
        scope
    }
}

impl Entity for Package {
    const TABLE: &'static str = "packages";
    const EDITABLE_FIELDS: &'static [&'static str] = &[
        "name",
        "price",
        "features",
        "is_popular",
        "display_order",
        "is_active",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn default_scope() -> EditorScope {
        Self::scope()
    }
}

impl ManagedEntity for Package {
    type Draft = NewPackage;

    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this package?";
}

/// Request payload for creating a package.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPackage {
    pub package_type: PackageType,

    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 60, message = "Price must be 1-60 characters"))]
    pub price: String,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub is_popular: bool,

    #[serde(default)]
    pub display_order: i32,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Groups packages by type keeping load order.
pub fn packages_of_type(packages: &[Package], package_type: PackageType) -> Vec<&Package> {
    packages
        .iter()
        .filter(|p| p.package_type == package_type)
        .collect()
}
