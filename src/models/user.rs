/// Organizational role resolved from the caller's `department` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Agent,
    Supervisor,
}

/// Things a role may do beyond placing its own orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create orders whose owning user is someone else.
    CreateOnBehalf,
    /// Orders created by this caller start out approved, with the caller as approver.
    SelfApprove,
    /// Approve or decline pending orders.
    AuthorizeOrders,
    /// Margin is checked against the internal actuary limit instead of the bank.
    ActuaryMargin,
}

impl Role {
    pub fn from_department(department: Option<&str>) -> Self {
        match department {
            Some("SUPERVISOR") => Role::Supervisor,
            Some("AGENT") => Role::Agent,
            _ => Role::Client,
        }
    }

    pub fn has(self, capability: Capability) -> bool {
        match capability {
            Capability::CreateOnBehalf | Capability::ActuaryMargin => {
                matches!(self, Role::Agent | Role::Supervisor)
            }
            Capability::SelfApprove | Capability::AuthorizeOrders => self == Role::Supervisor,
        }
    }
}

/// Authenticated caller, put into request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub department: Option<String>,
    // raw `Authorization` header, forwarded as-is to the banking service
    pub authorization: String,
}

impl CurrentUser {
    pub fn role(&self) -> Role {
        Role::from_department(self.department.as_deref())
    }
}
