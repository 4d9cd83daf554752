//! Contact records for mail-merge addressing.

use crate::error::{Error, Result};

/// One recipient record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email_address: String,
    /// Group or tag the contact belongs to.
    pub group_name: String,
    /// Any further delimited fields, in source order.
    pub extras: Vec<String>,
}

impl Contact {
    /// Creates a contact with no extras.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email_address: impl Into<String>,
        group_name: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email_address: email_address.into(),
            group_name: group_name.into(),
            extras: Vec::new(),
        }
    }

    /// Returns "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A collection of contacts with name lookup and filtered iteration.
#[derive(Debug, Clone, Default)]
pub struct ContactList {
    contacts: Vec<Contact>,
}

impl ContactList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses contacts from delimited text, one contact per line:
    /// first name, last name, email address, group; any further fields
    /// become extras. Blank lines are skipped, fields are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a line has fewer than four fields.
    pub fn from_delimited(text: &str, delimiter: char) -> Result<Self> {
        let mut list = Self::new();
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
            let [first, last, email, group, extras @ ..] = fields.as_slice() else {
                return Err(Error::Config(format!(
                    "contact line {} has {} fields, expected at least 4",
                    number + 1,
                    fields.len()
                )));
            };

            let mut contact = Contact::new(*first, *last, *email, *group);
            contact.extras = extras.iter().map(|s| (*s).to_string()).collect();
            list.push(contact);
        }
        Ok(list)
    }

    /// Appends a contact.
    pub fn push(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    /// Finds a contact by "First Last" name.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&Contact> {
        self.contacts
            .iter()
            .find(|contact| contact.full_name() == full_name)
    }

    /// Returns all contacts in the given group.
    pub fn in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Contact> {
        self.contacts
            .iter()
            .filter(move |contact| contact.group_name == group)
    }

    /// Iterates over all contacts.
    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }

    /// Returns the number of contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

impl<'a> IntoIterator for &'a ContactList {
    type Item = &'a Contact;
    type IntoIter = std::slice::Iter<'a, Contact>;

    fn into_iter(self) -> Self::IntoIter {
        self.contacts.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CSV: &str = "\
Ada, Lovelace, ada@example.com, friends
Grace, Hopper, grace@example.com, colleagues, extra note
";

    #[test]
    fn test_from_delimited() {
        let list = ContactList::from_delimited(CSV, ',').unwrap();
        assert_eq!(list.len(), 2);

        let ada = list.get("Ada Lovelace").unwrap();
        assert_eq!(ada.email_address, "ada@example.com");
        assert!(ada.extras.is_empty());

        let grace = list.get("Grace Hopper").unwrap();
        assert_eq!(grace.extras, vec!["extra note"]);
    }

    #[test]
    fn test_from_delimited_tsv() {
        let list = ContactList::from_delimited("A\tB\ta@b.c\tg", '\t').unwrap();
        assert_eq!(list.get("A B").unwrap().group_name, "g");
    }

    #[test]
    fn test_short_line_rejected() {
        let err = ContactList::from_delimited("only, three, fields", ',').unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_group_filter() {
        let list = ContactList::from_delimited(CSV, ',').unwrap();
        let friends: Vec<_> = list.in_group("friends").collect();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].first_name, "Ada");
    }

    #[test]
    fn test_unknown_name_is_none() {
        let list = ContactList::from_delimited(CSV, ',').unwrap();
        assert!(list.get("Alan Turing").is_none());
    }
}
