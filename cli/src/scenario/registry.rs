use crate::collection::HttpMethod;

/// HTTP methods seen during a run, in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct MethodRegistry {
    methods: Vec<HttpMethod>,
}

impl MethodRegistry {
    pub fn record(&mut self, method: &HttpMethod) {
        if !self.methods.contains(method) {
            self.methods.push(method.clone());
        }
    }

    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }
}

/// Auth identities seen during a run. Requests without bearer auth set the
/// anonymous flag instead of adding an identity.
#[derive(Debug, Default, Clone)]
pub struct AuthRegistry {
    identities: Vec<String>,
    anonymous: bool,
}

impl AuthRegistry {
    pub fn record(&mut self, identity: Option<&str>) {
        match identity {
            Some(identity) => {
                if !self.identities.iter().any(|i| i == identity) {
                    self.identities.push(identity.to_string());
                }
            }
            None => self.anonymous = true,
        }
    }

    pub fn identities(&self) -> &[String] {
        &self.identities
    }

    pub fn has_identities(&self) -> bool {
        !self.identities.is_empty()
    }

    pub fn has_anonymous(&self) -> bool {
        self.anonymous
    }
}
