//! Interactive console
//!
//! Simulates several tabs of one browser profile inside a single process.
//! Every tab gets its own [`ChatService`] and bus handle; they share the
//! profile store, the login session and the broadcast hub.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tabchat_bus::BusHub;
use tabchat_core::{
    ChatConfig, ChatService, KeyValueStore, Result, SenderRole, Subscription, UserSnapshot,
};
use tracing::{debug, info};

use crate::auth::SessionAuth;

const HELP: &str = "\
Commands:
  /tab new                       open another tab
  /tab <n>                       switch to tab n
  /login <id> <role> [name]      sign in (role: staff, customer, admin)
  /logout                        sign out
  /room <id>                     make <id> the active room of this tab
  /support <staff> <customer>    open the staff/customer room
  /rooms                         list rooms known to this tab
  /read [message-id]             mark the room, or one message, as read
  /unread                        total unread count of this tab
  /whoami                        show the signed in user
  /reset                         clear all chat data
  /help                          show this help
  /quit                          exit
Any other text is sent to the active room.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NewTab,
    SwitchTab(usize),
    Login {
        id: String,
        role: SenderRole,
        name: Option<String>,
    },
    Logout,
    Room(String),
    Support { staff: String, customer: String },
    Rooms,
    Read(Option<String>),
    Unread,
    WhoAmI,
    Reset,
    Help,
    Quit,
    Send(String),
    /// Malformed command, carries the usage line to show
    Usage(&'static str),
    Unknown(String),
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Send(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let command = match (name, args.as_slice()) {
        ("tab", ["new"]) => Command::NewTab,
        ("tab", [n]) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Command::SwitchTab(n),
            _ => Command::Usage("/tab new | /tab <n>"),
        },
        ("tab", _) => Command::Usage("/tab new | /tab <n>"),
        ("login", [id, role, name @ ..]) => match SenderRole::parse(role) {
            Some(role) => Command::Login {
                id: id.to_string(),
                role,
                name: (!name.is_empty()).then(|| name.join(" ")),
            },
            None => Command::Usage("/login <id> <staff|customer|admin> [name]"),
        },
        ("login", _) => Command::Usage("/login <id> <staff|customer|admin> [name]"),
        ("logout", []) => Command::Logout,
        ("room", [id]) => Command::Room(id.to_string()),
        ("room", _) => Command::Usage("/room <id>"),
        ("support", [staff, customer]) => Command::Support {
            staff: staff.to_string(),
            customer: customer.to_string(),
        },
        ("support", _) => Command::Usage("/support <staff> <customer>"),
        ("rooms", []) => Command::Rooms,
        ("read", []) => Command::Read(None),
        ("read", [id]) => Command::Read(Some(id.to_string())),
        ("read", _) => Command::Usage("/read [message-id]"),
        ("unread", []) => Command::Unread,
        ("whoami", []) => Command::WhoAmI,
        ("reset", []) => Command::Reset,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    };
    Some(command)
}

struct Tab {
    chat: ChatService,
    room: Option<String>,
    subscriptions: Vec<Subscription>,
}

pub struct Console {
    config: ChatConfig,
    hub: BusHub,
    store: Arc<dyn KeyValueStore>,
    auth: SessionAuth,
    tabs: Vec<Tab>,
    active: usize,
    notices: Arc<Mutex<Vec<String>>>,
}

impl Console {
    /// Build a console with one tab open
    pub fn new(
        config: ChatConfig,
        store: Arc<dyn KeyValueStore>,
        hub: BusHub,
        auth: SessionAuth,
    ) -> Result<Self> {
        let mut console = Self {
            config,
            hub,
            store,
            auth,
            tabs: Vec::new(),
            active: 0,
            notices: Arc::new(Mutex::new(Vec::new())),
        };
        console.open_tab()?;
        Ok(console)
    }

    /// Open a new tab and make it active. Returns its 1-based number.
    pub fn open_tab(&mut self) -> Result<usize> {
        let bus = self.hub.open(&self.config.channel_name)?;
        let chat = ChatService::new(
            &self.config,
            self.store.clone(),
            Box::new(bus),
            Arc::new(self.auth.clone()),
        );
        let number = self.tabs.len() + 1;

        let notices = self.notices.clone();
        let on_message = chat.subscribe_to_messages(move |room_id, message| {
            push_notice(
                &notices,
                format!(
                    "[tab {number}] {room_id} | {}: {}",
                    message.sender_name, message.content
                ),
            );
        });

        let notices = self.notices.clone();
        let last_unread = AtomicU64::new(0);
        let on_rooms = chat.subscribe_to_rooms(move |rooms| {
            let unread: u64 = rooms.iter().map(|room| u64::from(room.unread_count)).sum();
            if last_unread.swap(unread, Ordering::Relaxed) != unread {
                push_notice(&notices, format!("[tab {number}] unread: {unread}"));
            }
        });

        self.tabs.push(Tab {
            chat,
            room: None,
            subscriptions: vec![on_message, on_rooms],
        });
        self.active = number - 1;
        info!(tab = number, "Tab opened");
        Ok(number)
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// 1-based number of the active tab
    pub fn active_tab(&self) -> usize {
        self.active + 1
    }

    pub fn prompt(&self) -> String {
        let tab = &self.tabs[self.active];
        match &tab.room {
            Some(room) => format!("tab{} {}> ", self.active_tab(), room),
            None => format!("tab{}> ", self.active_tab()),
        }
    }

    /// Run one command, then let every tab catch up with the bus.
    ///
    /// Returns `false` once the user asked to quit.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<bool> {
        debug!(?command, tab = self.active + 1, "Executing command");
        match command {
            Command::NewTab => {
                let number = self.open_tab()?;
                writeln!(out, "Opened tab {number}")?;
            }
            Command::SwitchTab(number) => {
                if number <= self.tabs.len() {
                    self.active = number - 1;
                    writeln!(out, "Switched to tab {number}")?;
                } else {
                    writeln!(out, "No tab {number} (open tabs: {})", self.tabs.len())?;
                }
            }
            Command::Login { id, role, name } => {
                let mut user = UserSnapshot::new(id, role);
                if let Some(name) = name {
                    user = user.with_fullname(name);
                }
                writeln!(out, "Signed in as {} ({})", user.display_name(), user.role)?;
                self.auth.login(user);
            }
            Command::Logout => {
                self.auth.logout();
                writeln!(out, "Signed out")?;
            }
            Command::Room(room_id) => {
                let tab = &mut self.tabs[self.active];
                if tab.chat.get_room(&room_id).is_none() {
                    writeln!(out, "{room_id} is new here, it will be created on first message")?;
                }
                tab.room = Some(room_id);
            }
            Command::Support { staff, customer } => {
                let tab = &mut self.tabs[self.active];
                let room_id = tab
                    .chat
                    .create_staff_customer_room(Some(&staff), Some(&customer));
                writeln!(out, "Active room: {room_id}")?;
                tab.room = Some(room_id);
            }
            Command::Rooms => {
                let rooms = self.tabs[self.active].chat.get_all_rooms();
                if rooms.is_empty() {
                    writeln!(out, "No rooms")?;
                }
                for room in rooms {
                    writeln!(
                        out,
                        "{}  [{}]  messages: {}  unread: {}",
                        room.id,
                        room.participants.join(", "),
                        room.messages.len(),
                        room.unread_count
                    )?;
                }
            }
            Command::Read(message_id) => {
                let tab = &self.tabs[self.active];
                match (&tab.room, message_id) {
                    (None, _) => writeln!(out, "No active room")?,
                    (Some(room_id), None) => {
                        tab.chat.mark_room_as_read(room_id);
                        writeln!(out, "Marked {room_id} as read")?;
                    }
                    (Some(room_id), Some(message_id)) => {
                        tab.chat.mark_message_as_read(room_id, &message_id);
                        writeln!(out, "Marked {message_id} as read")?;
                    }
                }
            }
            Command::Unread => {
                let total = self.tabs[self.active].chat.get_total_unread_count();
                writeln!(out, "Unread: {total}")?;
            }
            Command::WhoAmI => match self.tabs[self.active].chat.get_current_user() {
                Some(user) => writeln!(out, "{} ({}, {})", user.display_name(), user.id, user.role)?,
                None => writeln!(out, "Not signed in, messages are sent as a guest")?,
            },
            Command::Reset => {
                self.tabs[self.active].chat.clear_all_data();
                writeln!(out, "Chat data cleared")?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(false),
            Command::Send(text) => {
                let tab = &self.tabs[self.active];
                match &tab.room {
                    None => writeln!(out, "No active room, use /room or /support first")?,
                    Some(room_id) => {
                        if tab.chat.send_message(room_id, &text).is_none() {
                            writeln!(out, "Nothing to send")?;
                        }
                    }
                }
            }
            Command::Usage(usage) => writeln!(out, "Usage: {usage}")?,
            Command::Unknown(line) => writeln!(out, "Unknown command: {line} (try /help)")?,
        }

        self.pump();
        self.flush_notices(out)?;
        Ok(true)
    }

    /// Deliver pending bus events to every tab
    pub fn pump(&self) -> usize {
        self.tabs
            .iter()
            .map(|tab| tab.chat.process_bus_events())
            .sum()
    }

    fn flush_notices(&self, out: &mut impl Write) -> Result<()> {
        let notices: Vec<String> = self
            .notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for notice in notices {
            writeln!(out, "{notice}")?;
        }
        Ok(())
    }

    /// Close every tab and the hub
    pub fn shutdown(&mut self) {
        for tab in self.tabs.drain(..) {
            for subscription in &tab.subscriptions {
                subscription.unsubscribe();
            }
            tab.chat.destroy();
        }
        self.hub.shutdown();
        info!("Console shut down");
    }
}

fn push_notice(notices: &Mutex<Vec<String>>, notice: String) {
    notices
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(notice);
}
