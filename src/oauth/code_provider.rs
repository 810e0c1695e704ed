//! Strategies for obtaining the authorization code.
//!
//! Either the crate runs its own one-shot redirect listener, or the caller
//! supplies a resolver that gets the code some other way (copy-paste, an
//! existing web server, ...). Both yield the same thing: an optional code.

use std::future::Future;

use async_trait::async_trait;
use tracing::debug;

use super::callback::{BoundCallbackListener, CallbackListener, code_from_request};
use super::state::StateToken;
use crate::error::Result;

/// Caller-supplied, out-of-band source of the authorization code.
///
/// Receives the state issued for the attempt. No timeout is imposed; wrap
/// the flow in `tokio::time::timeout` if a bound is needed.
#[async_trait]
pub trait CodeResolver: Send + Sync {
    async fn resolve(&self, state: &str) -> Result<String>;
}

#[async_trait]
impl<F, Fut> CodeResolver for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    async fn resolve(&self, state: &str) -> Result<String> {
        (self)(state.to_string()).await
    }
}

/// How the orchestrating flow obtains the authorization code.
pub enum CodeProvider {
    /// Run the embedded redirect listener.
    Listener(CallbackListener),
    /// Ask the caller.
    Resolver(Box<dyn CodeResolver>),
}

impl CodeProvider {
    pub fn listener(port: u16) -> Self {
        Self::Listener(CallbackListener::new(port))
    }

    pub fn resolver(resolver: impl CodeResolver + 'static) -> Self {
        Self::Resolver(Box::new(resolver))
    }

    /// Get ready to receive a code: binds the listener, if any.
    ///
    /// Binding happens before the consent URL is presented so that a fast
    /// redirect cannot arrive ahead of the socket.
    pub async fn begin(&self) -> Result<PendingCode<'_>> {
        match self {
            Self::Listener(listener) => {
                debug!(port = listener.port(), "Binding redirect listener");
                Ok(PendingCode::Listening(listener.bind().await?))
            }
            Self::Resolver(resolver) => Ok(PendingCode::Resolving(&**resolver)),
        }
    }

    /// Obtain the code for the attempt identified by `state`.
    ///
    /// `Ok(None)` means the user or provider produced no code.
    pub async fn obtain_code(&self, state: &StateToken) -> Result<Option<String>> {
        self.begin().await?.finish(state).await
    }
}

/// A code acquisition that has been started but not yet completed.
///
/// Dropping it closes the listener socket.
pub enum PendingCode<'a> {
    Listening(BoundCallbackListener),
    Resolving(&'a dyn CodeResolver),
}

impl PendingCode<'_> {
    /// Wait for the code.
    pub async fn finish(self, state: &StateToken) -> Result<Option<String>> {
        match self {
            Self::Listening(bound) => {
                let request = bound.receive().await?;
                code_from_request(&request, state)
            }
            Self::Resolving(resolver) => {
                debug!("Obtaining authorization code via caller resolver");
                let code = resolver.resolve(state.as_str()).await?;
                let code = code.trim();
                Ok((!code.is_empty()).then(|| code.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for CodeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Listener(listener) => f.debug_tuple("Listener").field(listener).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_closure_resolver_receives_state() {
        let provider = CodeProvider::resolver(|state: String| async move {
            assert_eq!(state, "st-1");
            Ok::<_, AuthError>("CODE".to_string())
        });
        let code = provider
            .obtain_code(&StateToken::from_value("st-1"))
            .await
            .unwrap();
        assert_eq!(code.as_deref(), Some("CODE"));
    }

    #[tokio::test]
    async fn test_blank_code_is_absent() {
        let provider = CodeProvider::resolver(|_state: String| async { Ok::<_, AuthError>("  \n".to_string()) });
        let code = provider.obtain_code(&StateToken::generate()).await.unwrap();
        assert_eq!(code, None);
    }

    #[tokio::test]
    async fn test_resolver_error_propagates() {
        let provider = CodeProvider::resolver(|_state: String| async {
            Err::<String, _>(AuthError::denied("user cancelled"))
        });
        let err = provider.obtain_code(&StateToken::generate()).await.unwrap_err();
        assert_eq!(err.kind(), "authorization_denied");
    }

    #[tokio::test]
    async fn test_listener_is_bound_before_finish() {
        use std::net::{IpAddr, Ipv4Addr};
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpStream;

        let provider = CodeProvider::Listener(
            CallbackListener::new(0).with_host(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        );
        let pending = provider.begin().await.unwrap();
        let PendingCode::Listening(ref bound) = pending else {
            panic!("expected a bound listener");
        };
        let addr = bound.local_addr();

        // Redirect arrives before anyone waits on it.
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /cb?state=st-2&code=XYZ HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        let code = pending.finish(&StateToken::from_value("st-2")).await.unwrap();
        assert_eq!(code.as_deref(), Some("XYZ"));

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
    }

    #[test]
    fn test_debug_hides_resolver() {
        let listener = CodeProvider::listener(8080);
        assert!(format!("{listener:?}").contains("8080"));

        let resolver = CodeProvider::resolver(|_state: String| async { Ok::<_, AuthError>("C".to_string()) });
        assert_eq!(format!("{resolver:?}"), "Resolver(..)");
    }

    struct CountingResolver(Arc<AtomicUsize>);

    #[async_trait]
    impl CodeResolver for CountingResolver {
        async fn resolve(&self, _state: &str) -> Result<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok("C".into())
        }
    }

    #[tokio::test]
    async fn test_struct_resolver_called_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CodeProvider::resolver(CountingResolver(Arc::clone(&calls)));
        provider.obtain_code(&StateToken::generate()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
