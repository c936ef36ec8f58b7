use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw identifier.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u64(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                crate::lenient::number(deserializer).map(Self)
            }
        }
    };
}

id_type!(
    /// Identifier of a faculty.
    FacultyId
);
id_type!(
    /// Identifier of a department.
    DepartmentId
);
id_type!(
    /// Identifier of a lab.
    LabId
);

/// A faculty, the top level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    /// Identifier.
    pub id: FacultyId,
    /// Display name.
    pub name: String,
}

/// A department within a faculty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Identifier.
    pub id: DepartmentId,
    /// Display name.
    pub name: String,
    /// The faculty the department belongs to.
    pub faculty_id: FacultyId,
}

/// A lab within a department. Components are listed per lab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lab {
    /// Identifier.
    pub id: LabId,
    /// Display name.
    pub name: String,
    /// The department the lab belongs to.
    pub department_id: DepartmentId,
}

/// The faculty → department → lab containment structure.
///
/// It is a flat set of rows linked by parent identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    /// All faculties.
    #[serde(default)]
    pub faculties: Vec<Faculty>,
    /// All departments.
    #[serde(default)]
    pub departments: Vec<Department>,
    /// All labs.
    #[serde(default)]
    pub labs: Vec<Lab>,
}

impl Hierarchy {
    /// Finds a faculty by identifier.
    #[must_use]
    pub fn faculty(&self, id: FacultyId) -> Option<&Faculty> {
        self.faculties.iter().find(|faculty| faculty.id == id)
    }

    /// Finds a department by identifier.
    #[must_use]
    pub fn department(&self, id: DepartmentId) -> Option<&Department> {
        self.departments
            .iter()
            .find(|department| department.id == id)
    }

    /// Finds a lab by identifier.
    #[must_use]
    pub fn lab(&self, id: LabId) -> Option<&Lab> {
        self.labs.iter().find(|lab| lab.id == id)
    }

    /// The departments of a faculty, in server order.
    pub fn departments_of(&self, faculty: FacultyId) -> impl Iterator<Item = &Department> {
        self.departments
            .iter()
            .filter(move |department| department.faculty_id == faculty)
    }

    /// The labs of a department, in server order.
    pub fn labs_of(&self, department: DepartmentId) -> impl Iterator<Item = &Lab> {
        self.labs
            .iter()
            .filter(move |lab| lab.department_id == department)
    }
}

/// Errors that can occur when navigating the hierarchy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The faculty does not exist.
    #[error("faculty {0} not found")]
    UnknownFaculty(FacultyId),
    /// The department does not exist.
    #[error("department {0} not found")]
    UnknownDepartment(DepartmentId),
    /// The lab does not exist.
    #[error("lab {0} not found")]
    UnknownLab(LabId),
    /// A department was chosen before a faculty.
    #[error("select a faculty first")]
    NoFaculty,
    /// A lab was chosen before a department.
    #[error("select a department first")]
    NoDepartment,
    /// The department belongs to another faculty.
    #[error("department {department} does not belong to faculty {faculty}")]
    DepartmentOutsideFaculty {
        /// The selected faculty.
        faculty: FacultyId,
        /// The rejected department.
        department: DepartmentId,
    },
    /// The lab belongs to another department.
    #[error("lab {lab} does not belong to department {department}")]
    LabOutsideDepartment {
        /// The selected department.
        department: DepartmentId,
        /// The rejected lab.
        lab: LabId,
    },
}

/// The user's current position in the hierarchy.
///
/// Choosing a faculty clears the department and lab; choosing a department
/// clears the lab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    faculty: Option<FacultyId>,
    department: Option<DepartmentId>,
    lab: Option<LabId>,
}

impl Selection {
    /// The selected faculty.
    #[must_use]
    pub const fn faculty(&self) -> Option<FacultyId> {
        self.faculty
    }

    /// The selected department.
    #[must_use]
    pub const fn department(&self) -> Option<DepartmentId> {
        self.department
    }

    /// The selected lab.
    #[must_use]
    pub const fn lab(&self) -> Option<LabId> {
        self.lab
    }

    /// Selects a faculty, clearing any department and lab.
    ///
    /// # Errors
    ///
    /// Returns an error if the faculty is not part of the hierarchy.
    pub fn select_faculty<'h>(
        &mut self,
        hierarchy: &'h Hierarchy,
        id: FacultyId,
    ) -> Result<&'h Faculty, SelectionError> {
        let faculty = hierarchy
            .faculty(id)
            .ok_or(SelectionError::UnknownFaculty(id))?;
        *self = Self {
            faculty: Some(id),
            department: None,
            lab: None,
        };
        Ok(faculty)
    }

    /// Selects a department of the selected faculty, clearing any lab.
    ///
    /// # Errors
    ///
    /// Returns an error if no faculty is selected, the department does not
    /// exist, or it belongs to a different faculty.
    pub fn select_department<'h>(
        &mut self,
        hierarchy: &'h Hierarchy,
        id: DepartmentId,
    ) -> Result<&'h Department, SelectionError> {
        let faculty = self.faculty.ok_or(SelectionError::NoFaculty)?;
        let department = hierarchy
            .department(id)
            .ok_or(SelectionError::UnknownDepartment(id))?;
        if department.faculty_id != faculty {
            return Err(SelectionError::DepartmentOutsideFaculty {
                faculty,
                department: id,
            });
        }
        self.department = Some(id);
        self.lab = None;
        Ok(department)
    }

    /// Selects a lab of the selected department.
    ///
    /// # Errors
    ///
    /// Returns an error if no department is selected, the lab does not
    /// exist, or it belongs to a different department.
    pub fn select_lab<'h>(
        &mut self,
        hierarchy: &'h Hierarchy,
        id: LabId,
    ) -> Result<&'h Lab, SelectionError> {
        let department = self.department.ok_or(SelectionError::NoDepartment)?;
        let lab = hierarchy.lab(id).ok_or(SelectionError::UnknownLab(id))?;
        if lab.department_id != department {
            return Err(SelectionError::LabOutsideDepartment { department, lab: id });
        }
        self.lab = Some(id);
        Ok(lab)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn hierarchy() -> Hierarchy {
        serde_json::from_value(json!({
            "faculties": [
                {"id": 1, "name": "Engineering"},
                {"id": "2", "name": "Science"}
            ],
            "departments": [
                {"id": 10, "name": "Electrical", "faculty_id": 1},
                {"id": 11, "name": "Mechanical", "faculty_id": "1"},
                {"id": 20, "name": "Chemistry", "faculty_id": 2}
            ],
            "labs": [
                {"id": 100, "name": "Power Lab", "department_id": 10},
                {"id": 101, "name": "Circuits Lab", "department_id": 10},
                {"id": 200, "name": "Organic Lab", "department_id": 20}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn children_are_filtered_by_parent() {
        let hierarchy = hierarchy();

        let departments: Vec<_> = hierarchy
            .departments_of(FacultyId::new(1))
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(departments, ["Electrical", "Mechanical"]);

        let labs: Vec<_> = hierarchy
            .labs_of(DepartmentId::new(10))
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(labs, ["Power Lab", "Circuits Lab"]);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let hierarchy: Hierarchy = serde_json::from_value(json!({"faculties": []})).unwrap();
        assert!(hierarchy.departments.is_empty());
        assert!(hierarchy.labs.is_empty());
    }

    #[test]
    fn selecting_a_faculty_clears_department_and_lab() {
        let hierarchy = hierarchy();
        let mut selection = Selection::default();
        selection.select_faculty(&hierarchy, FacultyId::new(1)).unwrap();
        selection
            .select_department(&hierarchy, DepartmentId::new(10))
            .unwrap();
        selection.select_lab(&hierarchy, LabId::new(101)).unwrap();
        assert_eq!(selection.lab(), Some(LabId::new(101)));

        selection.select_faculty(&hierarchy, FacultyId::new(2)).unwrap();

        assert_eq!(selection.faculty(), Some(FacultyId::new(2)));
        assert_eq!(selection.department(), None);
        assert_eq!(selection.lab(), None);
    }

    #[test]
    fn selecting_a_department_clears_lab() {
        let hierarchy = hierarchy();
        let mut selection = Selection::default();
        selection.select_faculty(&hierarchy, FacultyId::new(1)).unwrap();
        selection
            .select_department(&hierarchy, DepartmentId::new(10))
            .unwrap();
        selection.select_lab(&hierarchy, LabId::new(100)).unwrap();

        selection
            .select_department(&hierarchy, DepartmentId::new(11))
            .unwrap();

        assert_eq!(selection.lab(), None);
    }

    #[test]
    fn department_must_belong_to_selected_faculty() {
        let hierarchy = hierarchy();
        let mut selection = Selection::default();
        selection.select_faculty(&hierarchy, FacultyId::new(1)).unwrap();

        let error = selection
            .select_department(&hierarchy, DepartmentId::new(20))
            .unwrap_err();

        assert_eq!(
            error,
            SelectionError::DepartmentOutsideFaculty {
                faculty: FacultyId::new(1),
                department: DepartmentId::new(20),
            }
        );
        assert_eq!(selection.department(), None);
    }

    #[test]
    fn lab_requires_department() {
        let hierarchy = hierarchy();
        let mut selection = Selection::default();
        assert_eq!(
            selection.select_lab(&hierarchy, LabId::new(100)),
            Err(SelectionError::NoDepartment)
        );
    }

    #[test]
    fn unknown_faculty_is_rejected() {
        let hierarchy = hierarchy();
        let mut selection = Selection::default();
        assert_eq!(
            selection.select_faculty(&hierarchy, FacultyId::new(9)),
            Err(SelectionError::UnknownFaculty(FacultyId::new(9)))
        );
    }
}
