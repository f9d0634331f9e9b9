use super::{claims::AssertionClaims, error::JwtEncoderError, signed::SignedJwt};

pub mod local;

pub trait JwtSigner {
    fn sign(&self, claims: AssertionClaims) -> Result<SignedJwt, JwtEncoderError>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        pub JwtSignerMock {}
        impl JwtSigner for JwtSignerMock {
            fn sign(&self, claims: AssertionClaims) -> Result<SignedJwt, JwtEncoderError>;
        }
    }

    impl MockJwtSignerMock {
        pub fn should_not_sign(&mut self, error: JwtEncoderError) {
            self.expect_sign().once().return_once(move |_| Err(error));
        }
    }
}
