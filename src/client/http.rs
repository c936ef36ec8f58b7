use std::sync::Arc;

use reqwest::blocking::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;

use super::{
    Error, InventoryService,
    wire::{
        Account, Ack, CancelRequest, ComponentList, EditUserRequest, Envelope, FacultyList,
        LoginRequest, ReservationList, ReserveRequest, SignupRequest, SingleComponent,
    },
};
use crate::domain::{
    Component, ComponentId, Config, Credentials, Faculty, Hierarchy, LabId, ProfileUpdate,
    Registration, ReservationRequest, User, UserId,
};

const HIERARCHY: &str = "fetch_hierarchy.php";
const FACULTIES: &str = "get_faculties.php";
const COMPONENTS_BY_LAB: &str = "search_components.php";
const COMPONENTS_BY_NAME: &str = "search.php";
const COMPONENT: &str = "fetch_component.php";
const RESERVE: &str = "request_reserve.php";
const CANCEL_RESERVE: &str = "cancel_reserve.php";
const RESERVATIONS: &str = "fetch_reservations.php";
const LOGIN: &str = "login.php";
const SIGNUP: &str = "signup.php";
const EDIT_USER: &str = "edit_user.php";

/// HTTP client for the inventory backend.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Arc<str>,
    lookup_url: Arc<str>,
}

impl HttpClient {
    /// Creates a client for the service described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be initialised.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: Arc::from(config.base_url().trim_end_matches('/')),
            lookup_url: Arc::from(config.lookup_url().trim_end_matches('/')),
        })
    }

    fn url(base: &str, endpoint: &str) -> String {
        format!("{base}/{endpoint}")
    }

    fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        self.get_from(&self.base_url, endpoint, query)
    }

    fn get_from<T: DeserializeOwned>(
        &self,
        base: &str,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let request = self.client.get(Self::url(base, endpoint)).query(query);
        Self::send(endpoint, request)
    }

    fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        body: &B,
    ) -> Result<T, Error> {
        let request = self
            .client
            .post(Self::url(&self.base_url, endpoint))
            .json(body);
        Self::send(endpoint, request)
    }

    fn send<T: DeserializeOwned>(
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T, Error> {
        let transport = |source| Error::Transport { endpoint, source };

        let response = request.send().map_err(transport)?;
        let status = response.status();
        tracing::debug!(endpoint, status = status.as_u16(), "response received");

        if !status.is_success() {
            return Err(Error::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(transport)?;
        serde_json::from_str(&body).map_err(|source| {
            tracing::debug!(endpoint, body = %body, "undecodable response");
            Error::Decode { endpoint, source }
        })
    }

    /// Unwraps a mutation or authentication response, turning
    /// `success: false` into [`Error::Rejected`].
    fn accepted<T>(endpoint: &'static str, envelope: Envelope<T>) -> Result<T, Error> {
        if envelope.success {
            Ok(envelope.payload)
        } else {
            Err(Error::Rejected {
                endpoint,
                message: envelope.message,
            })
        }
    }

    /// Unwraps a listing response. The backend reports an empty result as
    /// `success: false`.
    fn listing<T: Default>(endpoint: &'static str, envelope: Envelope<T>) -> T {
        if envelope.success {
            envelope.payload
        } else {
            tracing::debug!(endpoint, message = ?envelope.message, "nothing found");
            T::default()
        }
    }

    fn account(endpoint: &'static str, envelope: Envelope<Account>) -> Result<User, Error> {
        Self::accepted(endpoint, envelope)?
            .user
            .ok_or_else(|| Error::Rejected {
                endpoint,
                message: Some("The server did not return a user record.".to_string()),
            })
    }
}

impl InventoryService for HttpClient {
    #[instrument(skip(self))]
    fn hierarchy(&self) -> Result<Hierarchy, Error> {
        self.get(HIERARCHY, &[])
    }

    #[instrument(skip(self))]
    fn faculties(&self) -> Result<Vec<Faculty>, Error> {
        let envelope: Envelope<FacultyList> = self.get(FACULTIES, &[])?;
        Ok(Self::accepted(FACULTIES, envelope)?.faculties)
    }

    #[instrument(skip(self))]
    fn components_in_lab(&self, lab: LabId) -> Result<Vec<Component>, Error> {
        let lab = lab.to_string();
        let envelope: Envelope<ComponentList> =
            self.get(COMPONENTS_BY_LAB, &[("lab_id", lab.as_str())])?;
        Ok(Self::listing(COMPONENTS_BY_LAB, envelope).components)
    }

    #[instrument(skip(self))]
    fn search_components(&self, name: &str) -> Result<Vec<Component>, Error> {
        let envelope: Envelope<ComponentList> =
            self.get(COMPONENTS_BY_NAME, &[("component_name", name)])?;
        Ok(Self::listing(COMPONENTS_BY_NAME, envelope).components)
    }

    #[instrument(skip(self), fields(id = %id))]
    fn component(&self, id: &ComponentId) -> Result<Option<Component>, Error> {
        let envelope: Envelope<SingleComponent> =
            self.get_from(&self.lookup_url, COMPONENT, &[("id", id.as_str())])?;
        Ok(Self::listing(COMPONENT, envelope).component)
    }

    #[instrument(skip(self, user), fields(id = %id, user = %user.id))]
    fn request_reserve(&self, id: &ComponentId, user: &User) -> Result<(), Error> {
        let body = ReserveRequest {
            reg_no: id.as_str(),
            user_id: user.id.as_str(),
            user_name: user.full_name(),
            email: &user.email,
            phone_number: &user.phone,
            faculty: user.faculty.as_deref().unwrap_or_default(),
            profile_picture: user.profile_picture.as_deref().unwrap_or_default(),
        };
        let envelope: Envelope<Ack> = self.post(RESERVE, &body)?;
        Self::accepted(RESERVE, envelope).map(|_| ())
    }

    #[instrument(skip(self, user), fields(id = %id, user = %user.id))]
    fn cancel_reserve(&self, id: &ComponentId, user: &User) -> Result<(), Error> {
        let body = CancelRequest {
            reg_no: id.as_str(),
            user_id: user.id.as_str(),
        };
        let envelope: Envelope<Ack> = self.post(CANCEL_RESERVE, &body)?;
        Self::accepted(CANCEL_RESERVE, envelope).map(|_| ())
    }

    #[instrument(skip(self))]
    fn reservations(&self) -> Result<Vec<ReservationRequest>, Error> {
        let envelope: Envelope<ReservationList> = self.get(RESERVATIONS, &[])?;
        Ok(Self::listing(RESERVATIONS, envelope).reservations)
    }

    #[instrument(skip_all, fields(email = %credentials.email))]
    fn login(&self, credentials: &Credentials) -> Result<User, Error> {
        let body = LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
        };
        let envelope = self.post(LOGIN, &body)?;
        Self::account(LOGIN, envelope)
    }

    #[instrument(skip_all, fields(email = %registration.email))]
    fn signup(&self, registration: &Registration) -> Result<User, Error> {
        let body = SignupRequest {
            email: &registration.email,
            password: &registration.password,
            first_name: &registration.first_name,
            last_name: &registration.last_name,
            phone: &registration.phone,
            faculty: registration.faculty.as_deref(),
        };
        let envelope = self.post(SIGNUP, &body)?;
        Self::account(SIGNUP, envelope)
    }

    #[instrument(skip(self, update), fields(id = %id))]
    fn edit_profile(&self, id: &UserId, update: &ProfileUpdate) -> Result<(), Error> {
        let body = EditUserRequest {
            id: id.as_str(),
            first_name: &update.first_name,
            last_name: &update.last_name,
            phone: &update.phone,
            faculty: update.faculty.as_deref(),
        };
        let envelope: Envelope<Ack> = self.post(EDIT_USER, &body)?;
        Self::accepted(EDIT_USER, envelope).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client(server: &MockServer) -> HttpClient {
        HttpClient::new(&Config::new(server.base_url())).unwrap()
    }

    fn user() -> User {
        User {
            id: UserId::new("17"),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.edu".to_string(),
            phone: "0771234567".to_string(),
            faculty: Some("Engineering".to_string()),
            profile_picture: None,
        }
    }

    #[test]
    fn fetches_hierarchy() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/fetch_hierarchy.php");
            then.status(200).json_body(json!({
                "faculties": [{"id": 1, "name": "Engineering"}],
                "departments": [{"id": 2, "name": "Electrical", "faculty_id": 1}],
                "labs": [{"id": "3", "name": "Power Lab", "department_id": "2"}]
            }));
        });

        let hierarchy = client(&server).hierarchy().unwrap();

        mock.assert();
        assert_eq!(hierarchy.faculties[0].name, "Engineering");
        assert_eq!(hierarchy.labs[0].id, LabId::new(3));
    }

    #[test]
    fn lists_components_of_a_lab() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search_components.php")
                .query_param("lab_id", "4");
            then.status(200).json_body(json!({
                "success": true,
                "components": [
                    {"reg_no": "CMP001", "component_name": "Oscilloscope", "lab_name": "Power Lab",
                     "is_reserved": 0, "request_to_reserve": 1},
                    {"reg_no": "CMP002", "component_name": "Multimeter", "lab_name": "Power Lab",
                     "is_reserved": 1, "request_to_reserve": 0}
                ]
            }));
        });

        let components = client(&server).components_in_lab(LabId::new(4)).unwrap();

        mock.assert();
        assert_eq!(components.len(), 2);
        assert!(components[0].request_pending);
        assert!(components[1].is_reserved);
    }

    #[test]
    fn listing_skips_unreadable_rows() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search_components.php")
                .query_param("lab_id", "4");
            then.status(200).json_body(json!({
                "success": true,
                "components": [
                    {"reg_no": "CMP001", "component_name": "Oscilloscope", "lab_name": "Power Lab"},
                    {"reg_no": "", "component_name": "Unlabelled", "lab_name": "Power Lab"},
                    {"reg_no": "CMP003", "component_name": "Soldering Iron"}
                ]
            }));
        });

        let components = client(&server).components_in_lab(LabId::new(4)).unwrap();

        mock.assert();
        let ids: Vec<&str> = components.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["CMP001", "CMP003"]);
    }

    #[test]
    fn unsuccessful_listing_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search.php");
            then.status(200)
                .json_body(json!({"success": false, "message": "No components found"}));
        });

        let components = client(&server).search_components("laser").unwrap();

        assert!(components.is_empty());
    }

    #[test]
    fn search_query_is_url_encoded() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search.php")
                .query_param("component_name", "power supply & cable");
            then.status(200)
                .json_body(json!({"success": true, "components": []}));
        });

        client(&server)
            .search_components("power supply & cable")
            .unwrap();

        mock.assert();
    }

    #[test]
    fn lookup_uses_lookup_url() {
        let api = MockServer::start();
        let scanner = MockServer::start();
        let mock = scanner.mock(|when, then| {
            when.method(GET)
                .path("/fetch_component.php")
                .query_param("id", "000123");
            then.status(200).json_body(json!({
                "success": true,
                "component": {
                    "reg_no": "000123", "component_name": "Bench PSU", "lab_name": "Power Lab"
                }
            }));
        });
        let mut config = Config::new(api.base_url());
        config.set_lookup_url(Some(scanner.base_url()));
        let client = HttpClient::new(&config).unwrap();

        let component = client
            .component(&ComponentId::new("000123").unwrap())
            .unwrap()
            .unwrap();

        mock.assert_calls(1);
        assert_eq!(component.name, "Bench PSU");
    }

    #[test]
    fn unknown_component_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/fetch_component.php");
            then.status(200).json_body(json!({"success": false}));
        });

        let component = client(&server)
            .component(&ComponentId::new("404").unwrap())
            .unwrap();

        assert_eq!(component, None);
    }

    #[test]
    fn reserve_posts_requester_details() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/request_reserve.php").json_body(json!({
                "reg_no": "CMP007",
                "user_id": "17",
                "user_name": "Ada Lovelace",
                "email": "ada@example.edu",
                "phone_number": "0771234567",
                "faculty": "Engineering",
                "profile_picture": ""
            }));
            then.status(200).json_body(json!({"success": true}));
        });

        client(&server)
            .request_reserve(&ComponentId::new("CMP007").unwrap(), &user())
            .unwrap();

        mock.assert();
    }

    #[test]
    fn rejected_cancel_carries_server_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/cancel_reserve.php")
                .json_body(json!({"reg_no": "CMP007", "user_id": "17"}));
            then.status(200)
                .json_body(json!({"success": false, "message": "No pending request"}));
        });

        let error = client(&server)
            .cancel_reserve(&ComponentId::new("CMP007").unwrap(), &user())
            .unwrap_err();

        assert!(!error.is_transport());
        assert_eq!(error.server_message(), Some("No pending request"));
    }

    #[test]
    fn http_error_status_is_transport_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/fetch_reservations.php");
            then.status(500).body("Internal Server Error");
        });

        let error = client(&server).reservations().unwrap_err();

        assert!(matches!(error, Error::Status { status: 500, .. }));
        assert!(error.is_transport());
    }

    #[test]
    fn html_body_is_decode_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/fetch_hierarchy.php");
            then.status(200).body("<html>Warning: mysqli_connect()</html>");
        });

        let error = client(&server).hierarchy().unwrap_err();

        assert!(matches!(error, Error::Decode { .. }));
    }

    #[test]
    fn unreachable_server_is_transport_failure() {
        let client = HttpClient::new(&Config::new("http://127.0.0.1:9")).unwrap();

        let error = client.hierarchy().unwrap_err();

        assert!(matches!(error, Error::Transport { .. }));
    }

    #[test]
    fn login_returns_user_record() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/login.php")
                .json_body(json!({"email": "ada@example.edu", "password": "hunter2"}));
            then.status(200).json_body(json!({
                "success": true,
                "user": {
                    "id": 17, "first_name": "Ada", "last_name": "Lovelace",
                    "email": "ada@example.edu", "phone": "0771234567", "faculty": "Engineering"
                }
            }));
        });

        let user = client(&server)
            .login(&Credentials {
                email: "ada@example.edu".to_string(),
                password: "hunter2".to_string(),
            })
            .unwrap();

        mock.assert();
        assert_eq!(user, self::user());
    }

    #[test]
    fn refused_login_carries_server_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/login.php");
            then.status(200)
                .json_body(json!({"success": false, "message": "Invalid email or password"}));
        });

        let error = client(&server)
            .login(&Credentials {
                email: "ada@example.edu".to_string(),
                password: "wrong".to_string(),
            })
            .unwrap_err();

        assert_eq!(error.server_message(), Some("Invalid email or password"));
    }

    #[test]
    fn signup_sends_registration() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/signup.php").json_body(json!({
                "email": "ada@example.edu",
                "password": "hunter2",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "phone": "0771234567",
                "faculty": "Engineering"
            }));
            then.status(200).json_body(json!({
                "success": true,
                "user": {
                    "id": "17", "first_name": "Ada", "last_name": "Lovelace",
                    "email": "ada@example.edu", "phone": "0771234567", "faculty": "Engineering"
                }
            }));
        });

        let user = client(&server)
            .signup(&Registration {
                email: "ada@example.edu".to_string(),
                password: "hunter2".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                phone: "0771234567".to_string(),
                faculty: Some("Engineering".to_string()),
            })
            .unwrap();

        mock.assert();
        assert_eq!(user.id, UserId::new("17"));
    }

    #[test]
    fn edit_profile_posts_editable_fields() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/edit_user.php").json_body(json!({
                "id": "17",
                "first_name": "Augusta",
                "last_name": "King",
                "phone": "0710000000",
                "faculty": null
            }));
            then.status(200).json_body(json!({"success": true}));
        });

        client(&server)
            .edit_profile(
                &UserId::new("17"),
                &ProfileUpdate {
                    first_name: "Augusta".to_string(),
                    last_name: "King".to_string(),
                    phone: "0710000000".to_string(),
                    faculty: None,
                },
            )
            .unwrap();

        mock.assert();
    }

    #[test]
    fn faculties_require_success() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/get_faculties.php");
            then.status(200).json_body(json!({"success": false}));
        });

        let error = client(&server).faculties().unwrap_err();

        assert!(matches!(error, Error::Rejected { .. }));
    }
}
