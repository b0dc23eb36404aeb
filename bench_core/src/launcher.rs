//! Keyboard-driven start menu model.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LaunchTarget {
    CompilerTests,
    CompilationFlow,
    LangtonsAnt,
    Dsa,
    FileUtil,
    KeyCap,
    PacketCapture,
    PerfAware,
    Swan,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: &'static str,
    pub accelerator: char,
    pub enabled: bool,
    pub target: LaunchTarget,
}

impl MenuEntry {
    const fn new(
        label: &'static str,
        accelerator: char,
        enabled: bool,
        target: LaunchTarget,
    ) -> Self {
        Self {
            label,
            accelerator,
            enabled,
            target,
        }
    }

    /// Byte range of the accelerator letter inside `label`, e.g. the `T` of `(T)ests`.
    pub fn accelerator_span(&self) -> Option<(usize, usize)> {
        let wanted = self.accelerator.to_ascii_uppercase();
        let bytes = self.label.as_bytes();
        (1..bytes.len().saturating_sub(1)).find_map(|idx| {
            let ch = bytes[idx] as char;
            let wrapped = bytes[idx - 1] == b'(' && bytes[idx + 1] == b')';
            (wrapped && ch.to_ascii_uppercase() == wanted).then_some((idx, idx + 1))
        })
    }
}

pub const DEFAULT_ENTRIES: [MenuEntry; 9] = [
    MenuEntry::new("Compiler (T)ests", 'T', true, LaunchTarget::CompilerTests),
    MenuEntry::new("Compilation (F)low", 'F', true, LaunchTarget::CompilationFlow),
    MenuEntry::new("(L)angton's Ant Simulator", 'L', false, LaunchTarget::LangtonsAnt),
    MenuEntry::new("(D)SA", 'D', false, LaunchTarget::Dsa),
    MenuEntry::new("file(u)til", 'U', false, LaunchTarget::FileUtil),
    MenuEntry::new("(k)eyCap", 'K', false, LaunchTarget::KeyCap),
    MenuEntry::new("Packet (C)apture Exercise", 'C', false, LaunchTarget::PacketCapture),
    MenuEntry::new("(P)erformance Aware Programming", 'P', false, LaunchTarget::PerfAware),
    MenuEntry::new("(S)wan [file explorer]", 'S', false, LaunchTarget::Swan),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LauncherKey {
    Up,
    Down,
    Activate,
    Char(char),
}

#[derive(Clone, Debug)]
pub struct LauncherMenu {
    entries: Vec<MenuEntry>,
    focused: Option<usize>,
}

impl LauncherMenu {
    pub fn new(entries: Vec<MenuEntry>) -> Self {
        let focused = entries.iter().position(|entry| entry.enabled);
        Self { entries, focused }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn focus(&mut self, index: usize) -> bool {
        match self.entries.get(index) {
            Some(entry) if entry.enabled => {
                self.focused = Some(index);
                true
            }
            _ => false,
        }
    }

    /// Activation through a click or keyboard; disabled entries do nothing.
    pub fn activate(&mut self, index: usize) -> Option<LaunchTarget> {
        let entry = self.entries.get(index)?;
        if !entry.enabled {
            return None;
        }
        self.focused = Some(index);
        Some(entry.target)
    }

    pub fn handle_key(&mut self, key: LauncherKey) -> Option<LaunchTarget> {
        match key {
            LauncherKey::Char(ch) => {
                let wanted = ch.to_uppercase().next()?;
                let index = self
                    .entries
                    .iter()
                    .position(|entry| entry.accelerator.to_ascii_uppercase() == wanted)?;
                self.activate(index)
            }
            LauncherKey::Down => {
                self.step(1);
                None
            }
            LauncherKey::Up => {
                self.step(-1);
                None
            }
            LauncherKey::Activate => {
                let index = self.focused?;
                self.activate(index)
            }
        }
    }

    fn step(&mut self, direction: isize) {
        let Some(start) = self.focused else {
            return;
        };
        let count = self.entries.len() as isize;
        let mut index = start as isize;
        for _ in 0..count {
            index = (index + direction).rem_euclid(count);
            if self.entries[index as usize].enabled {
                self.focused = Some(index as usize);
                return;
            }
        }
    }
}

impl Default for LauncherMenu {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRIES.to_vec())
    }
}
