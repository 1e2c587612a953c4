//! Approval gating for creatives.
//!
//! A creative moves from draft through creative sign-off (and, outside the
//! exempt region, regional sign-off) to deployment. Deployment is terminal.
//! The backend owns the flags; this module only decides which actions a
//! card may offer and refuses requests that cannot succeed.

use crate::{Approval, Creative};
use atelier_error::{ApprovalError, ApprovalErrorKind};
use serde::{Deserialize, Serialize};

/// Mutating actions available on a creative card.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalAction {
    /// Grant (or toggle) creative sign-off
    ApproveCreative,
    /// Grant (or toggle) regional sign-off
    ApproveRegional,
    /// Publish
    Deploy,
    /// Replace the asset with a fresh render
    Regenerate,
}

/// Derived position of a creative in the approval flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum ApprovalStage {
    /// No sign-off yet
    Draft,
    /// Creative sign-off only; still waiting on regional sign-off outside the exempt region
    CreativeApproved,
    /// Regional sign-off only
    RegionalApproved,
    /// Every required sign-off present, ready to deploy
    ReadyToDeploy,
    /// Published
    Deployed,
}

impl ApprovalStage {
    /// Stage of an approval record for a creative in the given regime.
    pub fn of(approval: &Approval, requires_regional: bool) -> Self {
        if approval.deployed {
            return Self::Deployed;
        }
        let regional_ok = !requires_regional || approval.regional_approved;
        match (approval.creative_approved, regional_ok) {
            (true, true) => Self::ReadyToDeploy,
            (true, false) => Self::CreativeApproved,
            (false, _) if requires_regional && approval.regional_approved => {
                Self::RegionalApproved
            }
            (false, _) => Self::Draft,
        }
    }

    /// Terminal stage check.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Deployed)
    }
}

/// The single rule gating publication.
///
/// Requires creative sign-off, regional sign-off unless the region is exempt,
/// and that the creative is not already deployed.
///
/// # Examples
///
/// ```
/// use atelier_core::{Approval, can_deploy};
///
/// let approval = Approval::with_flags(true, false, false);
/// assert!(can_deploy(&approval, false));
/// assert!(!can_deploy(&approval, true));
/// ```
pub fn can_deploy(approval: &Approval, requires_regional: bool) -> bool {
    approval.creative_approved
        && (!requires_regional || approval.regional_approved)
        && !approval.deployed
}

/// Invariant every server-confirmed record must satisfy.
///
/// `deployed` implies creative sign-off and, outside the exempt region,
/// regional sign-off.
pub fn invariant_holds(approval: &Approval, requires_regional: bool) -> bool {
    !approval.deployed
        || (approval.creative_approved && (!requires_regional || approval.regional_approved))
}

/// Refuse an action the card would not offer.
///
/// Regenerate is always allowed. Approval actions close once deployed and
/// regional approval does not exist for the exempt region.
pub fn check_action(creative: &Creative, action: ApprovalAction) -> Result<(), ApprovalError> {
    let approval = &creative.approval;
    let requires_regional = creative.requires_regional_approval();
    match action {
        ApprovalAction::Regenerate => Ok(()),
        ApprovalAction::ApproveCreative | ApprovalAction::ApproveRegional
            if approval.deployed =>
        {
            Err(ApprovalError::new(ApprovalErrorKind::AlreadyDeployed(
                creative.id.to_string(),
            )))
        }
        ApprovalAction::ApproveCreative => Ok(()),
        ApprovalAction::ApproveRegional if !requires_regional => {
            Err(ApprovalError::new(ApprovalErrorKind::RegionalNotApplicable {
                creative_id: creative.id.to_string(),
                region: creative
                    .region
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_default(),
            }))
        }
        ApprovalAction::ApproveRegional => Ok(()),
        ApprovalAction::Deploy => {
            if approval.deployed {
                return Err(ApprovalError::new(ApprovalErrorKind::AlreadyDeployed(
                    creative.id.to_string(),
                )));
            }
            if !approval.creative_approved {
                return Err(ApprovalError::new(ApprovalErrorKind::DeployNotPermitted {
                    creative_id: creative.id.to_string(),
                    reason: "creative approval required".to_string(),
                }));
            }
            if requires_regional && !approval.regional_approved {
                return Err(ApprovalError::new(ApprovalErrorKind::DeployNotPermitted {
                    creative_id: creative.id.to_string(),
                    reason: "regional approval required".to_string(),
                }));
            }
            Ok(())
        }
    }
}

/// Which controls a creative card shows and enables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_getters::Getters)]
pub struct ActionSet {
    /// Approve-creative enabled
    approve_creative: bool,
    /// Approve-regional shown at all
    regional_visible: bool,
    /// Approve-regional enabled
    approve_regional: bool,
    /// Deploy (and platform picker) enabled
    deploy: bool,
    /// Regenerate enabled
    regenerate: bool,
}

impl ActionSet {
    /// Controls for a creative, with every control disabled while `busy`.
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_core::{ActionSet, Approval, Creative};
    ///
    /// let mut creative: Creative = serde_json::from_str(
    ///     r#"{"id": 1, "idea_id": 7, "aspect_ratio": "1:1", "region": "US"}"#,
    /// ).unwrap();
    /// creative.approval = Approval::with_flags(true, false, false);
    ///
    /// let actions = ActionSet::for_creative(&creative, false);
    /// assert!(!actions.regional_visible());
    /// assert!(actions.deploy());
    /// assert!(!ActionSet::for_creative(&creative, true).deploy());
    /// ```
    pub fn for_creative(creative: &Creative, busy: bool) -> Self {
        let approval = &creative.approval;
        let requires_regional = creative.requires_regional_approval();
        let open = !busy && !approval.deployed;
        Self {
            approve_creative: open,
            regional_visible: requires_regional,
            approve_regional: open && requires_regional,
            deploy: !busy && can_deploy(approval, requires_regional),
            regenerate: !busy,
        }
    }

    /// Whether a given action is enabled.
    pub fn allows(&self, action: ApprovalAction) -> bool {
        match action {
            ApprovalAction::ApproveCreative => self.approve_creative,
            ApprovalAction::ApproveRegional => self.approve_regional,
            ApprovalAction::Deploy => self.deploy,
            ApprovalAction::Regenerate => self.regenerate,
        }
    }
}
