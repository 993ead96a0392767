use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{NewPartner, Partner, PartnerPatch};

impl Entity for Partner {
    type Id = String;
    type CreateParams = NewPartner;
    type Patch = PartnerPatch;
    type Action = ();
    type ActionResult = ();

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: NewPartner) -> Result<Self, FrameworkError> {
        let name = params.name.trim();
        if name.is_empty() {
            return Err(FrameworkError::Rejected("partner name is required".into()));
        }
        Ok(Self {
            id,
            name: name.to_string(),
            kind: params.kind,
            contact: params.contact.trim().to_string(),
        })
    }

    fn on_update(&mut self, patch: PartnerPatch) -> Result<(), FrameworkError> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(FrameworkError::Rejected("partner name is required".into()));
            }
            self.name = name.trim().to_string();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(contact) = patch.contact {
            self.contact = contact.trim().to_string();
        }
        Ok(())
    }

    /// Partners have no custom actions.
    fn handle_action(&mut self, _action: ()) -> Result<(), FrameworkError> {
        Ok(())
    }
}
