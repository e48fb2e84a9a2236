//! Single-instance ownership of chat surfaces

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use log::{debug, info};

use crate::config::ConfigSource;
use crate::providers::ModelClient;
use crate::relay::{Surface, SurfaceHandle};
use crate::request::DisplayMessage;

/// The places a chat UI can live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId
{   /// Editor panel opened by the chat/explain commands
    Panel
  , /// Sidebar view
    SidebarView
}

/// Called with the display receiver of each newly created surface so
/// the host can render what the relay emits
pub type AttachFn
  = Box<dyn Fn(SurfaceId, mpsc::UnboundedReceiver<DisplayMessage>)
      + Send + Sync>;

/// Whether `open_or_reveal` made a new surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opened
{   Created
  , Revealed
}

/// Owns at most one relay per surface id
pub struct SurfaceRegistry
{   surfaces: HashMap<SurfaceId, Surface>
  , client: Arc<dyn ModelClient>
  , config: Arc<dyn ConfigSource>
  , attach: AttachFn
}

impl SurfaceRegistry
{   pub fn new(
      client: Arc<dyn ModelClient>
    , config: Arc<dyn ConfigSource>
    , attach: AttachFn
    ) -> Self
    {   SurfaceRegistry
        {   surfaces: HashMap::new()
          , client
          , config
          , attach
        }
    }

    /// Existing handle for `id`, or a freshly spawned relay when there
    /// is none (or the old one has stopped)
    pub fn open_or_reveal(&mut self, id: SurfaceId)
      -> (SurfaceHandle, Opened)
    {   if let Some(surface) = self.surfaces.get(&id)
        {   let handle = surface.handle();
            if handle.is_alive()
            {   debug!("Revealing existing {:?}", id);
                return (handle, Opened::Revealed);
            }
            debug!("{:?} relay stopped, replacing it", id);
        }

        info!("Creating {:?}", id);
        let (surface, display_rx)
          = Surface::spawn(self.client.clone(), self.config.clone());
        let handle = surface.handle();
        self.surfaces.insert(id, surface);
        (self.attach)(id, display_rx);
        (handle, Opened::Created)
    }

    /// Handle for `id` without creating anything
    pub fn get(&self, id: SurfaceId) -> Option<SurfaceHandle>
    {   self.surfaces.get(&id)
          .map(|s| s.handle())
          .filter(|h| h.is_alive())
    }

    /// Dispose of the surface. A query it started keeps running; its
    /// result has nowhere to go.
    pub fn close(&mut self, id: SurfaceId) -> bool
    {   match self.surfaces.remove(&id)
        {   Some(surface) => {
              info!("Closing {:?}", id);
              let _ = surface.handle().shutdown();
              true
            }
          , None => false
        }
    }
}
