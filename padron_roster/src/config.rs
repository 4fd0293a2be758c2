// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// An entry of the electoral roll (padron).
///
/// Roll entries are reference data: they are loaded from outside and never
/// modified by this crate. The `ci` is kept as it was found in the source, the
/// comparable key is obtained with [`crate::normalize_ci`].
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Person {
    pub ci: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub section: Option<String>,
    pub polling_place: Option<String>,
    pub table: Option<String>,
    pub order: Option<String>,
}

impl Person {
    /// Given name and family name, joined by a single space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The three levels of the hierarchy an assignment can live at.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Role {
    Coordinator,
    SubCoordinator,
    Voter,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Coordinator, Role::SubCoordinator, Role::Voter];

    /// The tag used in the assignment tables.
    pub fn tag(&self) -> &'static str {
        match self {
            Role::Coordinator => "coordinador",
            Role::SubCoordinator => "subcoordinador",
            Role::Voter => "votante",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A row of one of the three assignment tables.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AssignmentRecord {
    pub ci: String,
    pub role: Role,
    /// Identity of the superior who made the assignment. Empty for the
    /// coordinators, who are added by the superadmin.
    pub assigned_by: String,
    /// For sub-coordinators, the coordinator owning them.
    pub coordinator_ci: String,
    /// Only meaningful for voters.
    pub vote_confirmed: bool,
    /// Contact phone recorded when the assignment was made. Takes precedence
    /// over the phone of the roll.
    pub phone: Option<String>,
}

impl AssignmentRecord {
    pub fn new(ci: &str, role: Role) -> AssignmentRecord {
        AssignmentRecord {
            ci: ci.to_string(),
            role,
            assigned_by: String::new(),
            coordinator_ci: String::new(),
            vote_confirmed: false,
            phone: None,
        }
    }
}

/// The raw tables, as read from the data source. Order is not significant.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Tables {
    pub roll: Vec<Person>,
    pub coordinators: Vec<AssignmentRecord>,
    pub sub_coordinators: Vec<AssignmentRecord>,
    pub voters: Vec<AssignmentRecord>,
}

/// The role of the user the statistics and the add actions are scoped to.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum UserRole {
    Superadmin,
    Coordinator,
    SubCoordinator,
    /// Any other role. It sees nothing.
    Other(String),
}

impl UserRole {
    pub fn from_tag(tag: &str) -> UserRole {
        match tag.trim().to_lowercase().as_str() {
            "superadmin" => UserRole::Superadmin,
            "coordinador" => UserRole::Coordinator,
            "subcoordinador" => UserRole::SubCoordinator,
            _ => UserRole::Other(tag.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            UserRole::Superadmin => "superadmin",
            UserRole::Coordinator => "coordinador",
            UserRole::SubCoordinator => "subcoordinador",
            UserRole::Other(s) => s.as_str(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ActingUser {
    pub ci: String,
    pub role: UserRole,
}

impl ActingUser {
    pub fn new(ci: &str, role: UserRole) -> ActingUser {
        ActingUser {
            ci: ci.to_string(),
            role,
        }
    }
}

// ******** Output data structures *********

/// An assignment merged with its roll entry.
///
/// The roll fields are `None` when the assignment has no matching roll entry.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LinkedEntity {
    /// Normalized identity key.
    pub ci: String,
    pub role: Role,
    pub assigned_by: String,
    pub coordinator_ci: String,
    pub vote_confirmed: bool,
    pub in_roll: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub section: Option<String>,
    pub polling_place: Option<String>,
    pub table: Option<String>,
    pub order: Option<String>,
}

impl LinkedEntity {
    /// The display name, or the identity key when the person is not in the roll.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => format!("{} {}", f, l),
            (Some(n), None) | (None, Some(n)) => n.clone(),
            (None, None) => self.ci.clone(),
        }
    }
}

/// Who holds the assignment of a roll entry that is already taken.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Holder {
    pub role: Role,
    /// Display name of the superior that made the assignment, when it can be
    /// resolved.
    pub assigned_by: Option<String>,
}

/// A roll entry, as offered by the person picker.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PoolEntry<'a> {
    pub person: &'a Person,
    /// Normalized identity key.
    pub ci: String,
    pub holder: Option<Holder>,
}

impl<'a> PoolEntry<'a> {
    pub fn is_assigned(&self) -> bool {
        self.holder.is_some()
    }
}

/// One page of search results.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SearchPage<'a, 'b> {
    pub entries: Vec<&'b PoolEntry<'a>>,
    /// 1-based, already clamped.
    pub page: usize,
    pub page_count: usize,
    pub total_matches: usize,
}

/// Errors returned by the add action. The state is never modified when one
/// of these is returned.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RosterErrors {
    EmptyIdentity,
    UnknownPerson(String),
    AlreadyAssigned(String, Holder),
    RoleNotAllowed(UserRole, Role),
}

impl Error for RosterErrors {}

impl Display for RosterErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterErrors::EmptyIdentity => write!(f, "empty identity key"),
            RosterErrors::UnknownPerson(ci) => write!(f, "{} is not in the padron", ci),
            RosterErrors::AlreadyAssigned(ci, holder) => match &holder.assigned_by {
                Some(name) => write!(f, "{} is already a {} of {}", ci, holder.role, name),
                None => write!(f, "{} is already a {}", ci, holder.role),
            },
            RosterErrors::RoleNotAllowed(user, target) => {
                write!(f, "a {} cannot add a {}", user.tag(), target)
            }
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct SearchRules {
    pub page_size: usize,
}

impl SearchRules {
    pub const DEFAULT_RULES: SearchRules = SearchRules { page_size: 20 };
}

impl Default for SearchRules {
    fn default() -> Self {
        SearchRules::DEFAULT_RULES
    }
}
