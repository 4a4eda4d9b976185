// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        admin::{Admin, AdminProfile, AdminRole},
        branch::{Branch, BranchOption},
    },
};

/// Marca gravada de que o admin está logado. Some no logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub admin_id: Uuid,
    pub username: String,
    pub started_at: DateTime<Utc>,
}

// ---
// BranchAccess: quais filiais o admin logado pode ver e alterar
// ---
// Regra: se `admin_branches` não estiver vazio, `current_branch` é uma delas.
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchAccess {
    pub admin_id: Uuid,
    pub role: AdminRole,
    pub current_branch: Option<String>,
    pub admin_branches: Vec<String>,
}

impl BranchAccess {
    /// Começa pela filial preferida se for permitida; senão, pela primeira permitida.
    pub fn new(
        admin_id: Uuid,
        role: AdminRole,
        admin_branches: Vec<String>,
        preferred: Option<String>,
    ) -> Self {
        let current_branch = preferred
            .filter(|id| admin_branches.contains(id))
            .or_else(|| admin_branches.first().cloned());

        Self {
            admin_id,
            role,
            current_branch,
            admin_branches,
        }
    }

    pub fn can_access_branch(&self, branch_id: &str) -> bool {
        self.admin_branches.iter().any(|b| b == branch_id)
    }

    /// Quem decide é o papel gravado; cobrir todas as filiais é só conveniência (`covers_all_branches`).
    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }

    pub fn covers_all_branches(&self, branches: &[Branch]) -> bool {
        self.admin_branches.len() == branches.len()
    }

    pub fn require_super_admin(&self, action: &str) -> Result<(), AppError> {
        if self.is_super_admin() {
            Ok(())
        } else {
            Err(AppError::access_denied(format!("only a super admin may {action}")))
        }
    }

    /// Filial não permitida: retorna `false` e não mexe no estado.
    pub fn switch_to(&mut self, branch_id: &str) -> bool {
        if !self.can_access_branch(branch_id) {
            return false;
        }
        self.current_branch = Some(branch_id.to_string());
        true
    }

    pub fn branches_for_select(&self, branches: &[Branch]) -> Vec<BranchOption> {
        branches
            .iter()
            .filter(|b| self.can_access_branch(&b.id))
            .map(Branch::to_option)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchBranchResponse {
    pub switched: bool,
    pub current_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchBranchPayload {
    pub branch_id: String,
}

/// O que o auth guard anexa em toda request autenticada.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub admin: Admin,
    pub access: BranchAccess,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: AdminProfile,
    pub current_branch: Option<String>,
    pub branches: Vec<BranchOption>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionBranches {
    pub current_branch: Option<String>,
    pub is_super_admin: bool,
    pub branches: Vec<BranchOption>,
}
