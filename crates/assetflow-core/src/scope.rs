//! Scoping resolver: which company's assets and requests a user may see.
//!
//! An HR user's scope is their own email. A booked employee's scope is the
//! email of the HR they are booked under. An unbooked employee has no scope:
//! every scoped listing returns empty for them, which is a normal state and
//! never an error.

use crate::{
  Email,
  store::RequestScope,
  user::{Role, User},
};

/// The email used to filter assets and requests for `user`.
pub fn scoping_email(user: &User) -> Option<&Email> {
  match user.user_role {
    Role::Hr => Some(&user.user_email),
    Role::Employee => user.current_working_company_email.as_ref(),
  }
}

/// The request-listing scope for `user`: the whole company for HR, the
/// user's own requests within their company for employees.
pub fn request_scope(user: &User) -> Option<RequestScope> {
  let company = scoping_email(user)?.clone();
  let requester = match user.user_role {
    Role::Hr => None,
    Role::Employee => Some(user.user_email.clone()),
  };
  Some(RequestScope { company, requester })
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use chrono::Utc;

  use super::*;

  fn user(email: &str, role: Role, company: Option<&str>) -> User {
    User {
      user_email:                    Email::parse(email).unwrap(),
      user_name:                     email.into(),
      user_role:                     role,
      user_image:                    None,
      date_of_birth:                 None,
      company_name:                  None,
      company_logo:                  None,
      current_working_company_email: company.map(|c| Email::parse(c).unwrap()),
      current_working_company_name:  None,
      current_working_company_image: None,
      current_membership_limit:      0,
      current_employees:             BTreeSet::new(),
      created_at:                    Utc::now(),
    }
  }

  #[test]
  fn hr_scopes_to_self() {
    let hr = user("h@co.com", Role::Hr, None);
    assert_eq!(scoping_email(&hr).unwrap().as_str(), "h@co.com");
    let scope = request_scope(&hr).unwrap();
    assert!(scope.requester.is_none());
  }

  #[test]
  fn booked_employee_scopes_to_company() {
    let e = user("e1@x.com", Role::Employee, Some("h@co.com"));
    assert_eq!(scoping_email(&e).unwrap().as_str(), "h@co.com");
    let scope = request_scope(&e).unwrap();
    assert_eq!(scope.company.as_str(), "h@co.com");
    assert_eq!(scope.requester.unwrap().as_str(), "e1@x.com");
  }

  #[test]
  fn unbooked_employee_has_no_scope() {
    let e = user("e1@x.com", Role::Employee, None);
    assert!(scoping_email(&e).is_none());
    assert!(request_scope(&e).is_none());
  }
}
