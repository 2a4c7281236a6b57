use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "tokenization_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TokenizationType {
    #[default]
    Fractional,
    Whole,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "tokenization_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenizationStatus {
    PendingDocuments,
    PendingNotaryVerification,
    NotaryVerified,
    ContractDeployed,
}

impl TokenizationStatus {
    /// Requests only ever move forward one stage; re-submitting the current
    /// stage is allowed so documents can be re-attached.
    pub fn can_transition_to(&self, to: TokenizationStatus) -> bool {
        use TokenizationStatus::*;

        matches!(
            (self, to),
            (PendingDocuments, PendingDocuments)
                | (PendingDocuments, PendingNotaryVerification)
                | (PendingNotaryVerification, PendingNotaryVerification)
                | (PendingNotaryVerification, NotaryVerified)
                | (NotaryVerified, ContractDeployed)
        )
    }

    /// Stages in which documents may still be (re)attached.
    pub fn accepts_documents(&self) -> bool {
        matches!(
            self,
            TokenizationStatus::PendingDocuments | TokenizationStatus::PendingNotaryVerification
        )
    }
}

/// Storage links gathered by the tokenization flow, keyed the way the
/// browser client submits them.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLinks {
    pub property_title: Option<String>,
    pub rgp_certification: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipal_permits: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_agreements: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TokenizationRequest {
    pub id: String,
    pub wallet_address: String,
    pub property_address: String,
    pub estimated_value: f64,
    pub tokenization_type: TokenizationType,
    pub status: TokenizationStatus,
    pub documents_uploaded: bool,
    pub notary_verified: bool,
    pub contract_deployed: bool,
    pub arweave_links: Option<Json<DocumentLinks>>,
    pub property_token_id: Option<i64>,
    pub contract_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Cannot move tokenization request from {from:?} to {to:?}")]
pub struct TransitionError {
    pub from: TokenizationStatus,
    pub to: TokenizationStatus,
}

/// A single state change applied to a stored request.
#[derive(Debug, Clone)]
pub enum TokenizationUpdate {
    Documents {
        links: DocumentLinks,
        documents_uploaded: bool,
        status: Option<TokenizationStatus>,
    },
    NotaryVerified,
    ContractDeployed {
        property_token_id: i64,
        contract_address: String,
    },
}

impl TokenizationRequest {
    fn step_to(&self, target: TokenizationStatus) -> Result<TokenizationStatus, TransitionError> {
        if target == self.status || !self.status.can_transition_to(target) {
            return Err(TransitionError { from: self.status, to: target });
        }
        Ok(target)
    }

    pub fn new(
        id: String,
        wallet_address: String,
        property_address: String,
        estimated_value: f64,
        tokenization_type: TokenizationType,
    ) -> Self {
        let now = Utc::now();
        TokenizationRequest {
            id,
            wallet_address,
            property_address,
            estimated_value,
            tokenization_type,
            status: TokenizationStatus::PendingDocuments,
            documents_uploaded: false,
            notary_verified: false,
            contract_deployed: false,
            arweave_links: None,
            property_token_id: None,
            contract_address: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies `update` in place, refusing transitions that skip or revisit
    /// a stage. Documents can only move a request as far as
    /// `PendingNotaryVerification`; the later stages belong to the notary and
    /// deployment updates.
    pub fn apply(&mut self, update: TokenizationUpdate) -> Result<(), TransitionError> {
        let target = match &update {
            TokenizationUpdate::Documents { documents_uploaded, status, .. } => {
                let target = status.unwrap_or(if *documents_uploaded {
                    TokenizationStatus::PendingNotaryVerification
                } else {
                    self.status
                });
                let reject = TransitionError { from: self.status, to: target };

                if !self.status.accepts_documents() || !target.accepts_documents() {
                    return Err(reject);
                }
                if target == TokenizationStatus::PendingNotaryVerification && !documents_uploaded {
                    return Err(reject);
                }
                if target != self.status && !self.status.can_transition_to(target) {
                    return Err(reject);
                }
                target
            }
            TokenizationUpdate::NotaryVerified => {
                self.step_to(TokenizationStatus::NotaryVerified)?
            }
            TokenizationUpdate::ContractDeployed { .. } => {
                self.step_to(TokenizationStatus::ContractDeployed)?
            }
        };

        match update {
            TokenizationUpdate::Documents { links, documents_uploaded, .. } => {
                self.arweave_links = Some(Json(links));
                self.documents_uploaded = documents_uploaded;
            }
            TokenizationUpdate::NotaryVerified => {
                self.notary_verified = true;
            }
            TokenizationUpdate::ContractDeployed { property_token_id, contract_address } => {
                self.property_token_id = Some(property_token_id);
                self.contract_address = Some(contract_address);
                self.contract_deployed = true;
            }
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TokenizationRequest {
        TokenizationRequest::new(
            "token-1".to_string(),
            "0x23de198f1520ad386565fc98aee6abb3ae5052be".to_string(),
            "Zone 10, Guatemala City".to_string(),
            250000.0,
            TokenizationType::Fractional,
        )
    }

    fn documents(status: Option<TokenizationStatus>) -> TokenizationUpdate {
        TokenizationUpdate::Documents {
            links: DocumentLinks {
                property_title: Some("ar://title".to_string()),
                rgp_certification: Some("ar://rgp".to_string()),
                photos: vec!["ar://photo1".to_string()],
                ..Default::default()
            },
            documents_uploaded: true,
            status,
        }
    }

    #[test]
    fn test_full_lifecycle() {
        let mut req = request();
        assert_eq!(req.status, TokenizationStatus::PendingDocuments);

        req.apply(documents(None)).unwrap();
        assert_eq!(req.status, TokenizationStatus::PendingNotaryVerification);
        assert!(req.documents_uploaded);

        req.apply(TokenizationUpdate::NotaryVerified).unwrap();
        assert!(req.notary_verified);

        req.apply(TokenizationUpdate::ContractDeployed {
            property_token_id: 7,
            contract_address: "CREGISTRY".to_string(),
        })
        .unwrap();
        assert_eq!(req.status, TokenizationStatus::ContractDeployed);
        assert!(req.contract_deployed);
        assert_eq!(req.property_token_id, Some(7));
    }

    #[test]
    fn test_documents_can_be_reattached() {
        let mut req = request();
        req.apply(documents(None)).unwrap();
        req.apply(documents(Some(TokenizationStatus::PendingNotaryVerification))).unwrap();
        assert_eq!(req.status, TokenizationStatus::PendingNotaryVerification);
    }

    #[test]
    fn test_cannot_skip_notary() {
        let mut req = request();
        req.apply(documents(None)).unwrap();
        let err = req
            .apply(TokenizationUpdate::ContractDeployed {
                property_token_id: 1,
                contract_address: "C".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.from, TokenizationStatus::PendingNotaryVerification);
        assert!(!req.contract_deployed);
    }

    #[test]
    fn test_notary_requires_documents() {
        let mut req = request();
        assert!(req.apply(TokenizationUpdate::NotaryVerified).is_err());
        assert!(!req.notary_verified);
    }

    #[test]
    fn test_double_verification_rejected() {
        let mut req = request();
        req.apply(documents(None)).unwrap();
        req.apply(TokenizationUpdate::NotaryVerified).unwrap();
        assert!(req.apply(TokenizationUpdate::NotaryVerified).is_err());
    }

    fn links_only(status: Option<TokenizationStatus>) -> TokenizationUpdate {
        match documents(status) {
            TokenizationUpdate::Documents { links, status, .. } => TokenizationUpdate::Documents {
                links,
                documents_uploaded: false,
                status,
            },
            other => other,
        }
    }

    #[test]
    fn test_documents_cannot_set_later_stages() {
        let mut req = request();
        req.apply(documents(None)).unwrap();

        for status in [TokenizationStatus::NotaryVerified, TokenizationStatus::ContractDeployed] {
            let err = req.apply(documents(Some(status))).unwrap_err();
            assert_eq!(err.to, status);
        }
        assert_eq!(req.status, TokenizationStatus::PendingNotaryVerification);
        assert!(!req.notary_verified);
        assert!(!req.contract_deployed);
    }

    #[test]
    fn test_pending_notary_needs_uploaded_documents() {
        let mut req = request();

        let err = req
            .apply(links_only(Some(TokenizationStatus::PendingNotaryVerification)))
            .unwrap_err();
        assert_eq!(err.from, TokenizationStatus::PendingDocuments);
        assert_eq!(req.status, TokenizationStatus::PendingDocuments);

        // Links alone keep the request where it is.
        req.apply(links_only(None)).unwrap();
        assert_eq!(req.status, TokenizationStatus::PendingDocuments);
        assert!(!req.documents_uploaded);
    }

    #[test]
    fn test_documents_locked_after_notary_verification() {
        let mut req = request();
        req.apply(documents(None)).unwrap();
        req.apply(TokenizationUpdate::NotaryVerified).unwrap();

        assert!(req.apply(documents(None)).is_err());
        assert!(req.apply(links_only(None)).is_err());
        assert_eq!(req.status, TokenizationStatus::NotaryVerified);
        assert!(req.documents_uploaded);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let value = serde_json::to_value(request()).unwrap();
        assert_eq!(value["status"], "pending_documents");
        assert_eq!(value["tokenizationType"], "fractional");
        assert_eq!(value["walletAddress"], "0x23de198f1520ad386565fc98aee6abb3ae5052be");
    }
}
