// Testbed: Lab Topology Resolution for Hardware-in-the-Loop Tests
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.


//! # Console Connection
//!
//! Telnet connection to the serial console of a linux based device (a linux host, or a switch
//! running a linux network OS). Ports are controlled with `ip link`, and their operational state is
//! read from sysfs.

use testbed::control::{AdminState, DeviceError, OperState, PortControl};
use testbed::topology::PortId;

use log::*;
use regex::Regex;
use telnet::{Telnet, TelnetEvent};

use std::str;
use std::thread::sleep;
use std::time::{Duration, Instant};

const BOOT_TIMEOUT_S: u64 = 100;
const COMMAND_TIMEOUT_S: u64 = 10;
const PROMPT_RE: &str = r"(?m)[a-zA-Z0-9_\-.@():~/]+[#$] \z";

/// Telnet connection to a console with a shell prompt
pub struct ConsoleConnection {
    c: Telnet,
    prompt_re: Regex,
}

impl std::fmt::Debug for ConsoleConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleConnection")
            .field("prompt_re", &self.prompt_re)
            .finish_non_exhaustive()
    }
}

impl ConsoleConnection {
    /// Connect to the console, and wait until the shell prompt appears
    pub fn new(host: &str, port: u16) -> Result<Self, DeviceError> {
        let prompt_re = Regex::new(PROMPT_RE)
            .map_err(|e| DeviceError::Connection(format!("Invalid prompt pattern: {}", e)))?;

        let mut c = Telnet::connect((host, port), 2048)?;
        // receive all initial events
        while let Ok(event) = c.read_timeout(Duration::from_millis(1)) {
            if matches!(event, TelnetEvent::TimedOut) {
                break;
            }
        }

        let mut conn = Self { c, prompt_re };
        conn.c.write(b"\n")?;
        conn.receive_until_prompt(Duration::from_secs(BOOT_TIMEOUT_S)).map_err(|e| {
            error!("Device at {}:{} did not boot up: {}", host, port, e);
            e
        })?;
        debug!("Console {}:{} is ready", host, port);
        Ok(conn)
    }

    /// Send a command, and return everything printed before the next prompt
    pub fn send_wait(&mut self, cmd: impl AsRef<str>) -> Result<String, DeviceError> {
        trace!("console: {}", cmd.as_ref());
        self.c.write(format!("{}\n", cmd.as_ref()).as_bytes())?;
        let output = self.receive_until_prompt(Duration::from_secs(COMMAND_TIMEOUT_S))?;
        Ok(strip_echo(&output, cmd.as_ref()))
    }

    /// Leave the shell
    pub fn logout(&mut self) -> Result<(), DeviceError> {
        self.c.write(b"exit\n")?;
        Ok(())
    }

    fn receive_until_prompt(&mut self, timeout: Duration) -> Result<String, DeviceError> {
        let mut buffer: Vec<u8> = Vec::new();
        let start = Instant::now();
        loop {
            match self.c.read_nonblocking()? {
                TelnetEvent::NoData => {
                    if start.elapsed() > timeout {
                        debug!("Incomplete answer: {}", String::from_utf8_lossy(&buffer));
                        return Err(DeviceError::Connection(format!(
                            "No prompt received within {:?}",
                            timeout
                        )));
                    }
                    sleep(Duration::from_millis(10));
                }
                TelnetEvent::Data(d) => {
                    buffer.extend_from_slice(&d);
                    if let Some(output) = until_prompt(&self.prompt_re, &buffer)? {
                        return Ok(output);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Decode the bytes received so far, and return them once they end with the prompt. A character
/// split over two telnet packets is incomplete, not invalid.
fn until_prompt(prompt_re: &Regex, buffer: &[u8]) -> Result<Option<String>, DeviceError> {
    let text = match str::from_utf8(buffer) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() => return Ok(None),
        Err(e) => return Err(DeviceError::UnexpectedResponse(e.to_string())),
    };
    Ok(if prompt_re.is_match(text) { Some(text.replace("\r\n", "\n")) } else { None })
}

/// Remove the echoed command and the trailing prompt from the console output
fn strip_echo(output: &str, cmd: &str) -> String {
    let mut lines: Vec<&str> = output.lines().collect();
    if lines.first().map(|l| l.trim_end() == cmd.trim()).unwrap_or(false) {
        lines.remove(0);
    }
    lines.pop();
    lines.join("\n")
}

/// Parse the content of `/sys/class/net/<iface>/operstate`. Every state except `up` is reported as
/// down.
pub fn parse_operstate(output: &str) -> Result<OperState, DeviceError> {
    for line in output.lines().map(|l| l.trim()) {
        match line {
            "up" => return Ok(OperState::Up),
            "down" | "unknown" | "dormant" | "lowerlayerdown" | "notpresent" | "testing" => {
                return Ok(OperState::Down)
            }
            _ => {}
        }
    }
    Err(DeviceError::UnexpectedResponse(output.trim().to_string()))
}

/// Check the output of an `ip link` command. The command prints nothing on success.
fn check_ip_link(output: &str, port: &PortId) -> Result<(), DeviceError> {
    let output = output.trim();
    if output.is_empty() {
        Ok(())
    } else if output.contains("Cannot find device") {
        Err(DeviceError::UnknownPort(port.clone()))
    } else {
        Err(DeviceError::Rejected { port: port.clone(), reason: output.to_string() })
    }
}

/// # Linux Port Control
///
/// Controls the interfaces of a linux based device through its console.
#[derive(Debug)]
pub struct LinuxPortControl {
    conn: ConsoleConnection,
}

impl LinuxPortControl {
    /// Create the port control on an established console connection
    pub fn new(conn: ConsoleConnection) -> Self {
        Self { conn }
    }
}

impl PortControl for LinuxPortControl {
    fn set_admin_state(&mut self, port: &PortId, state: AdminState) -> Result<(), DeviceError> {
        let action = match state {
            AdminState::Up => "up",
            AdminState::Down => "down",
        };
        let output = self.conn.send_wait(format!("ip link set dev {} {}", port, action))?;
        check_ip_link(&output, port)
    }

    fn operational_state(&mut self, port: &PortId) -> Result<OperState, DeviceError> {
        let output = self.conn.send_wait(format!("cat /sys/class/net/{}/operstate", port))?;
        if output.contains("No such file or directory") {
            return Err(DeviceError::UnknownPort(port.clone()));
        }
        parse_operstate(&output)
    }

    fn cleanup(&mut self) -> Result<(), DeviceError> {
        self.conn.logout()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn operstate() {
        assert_eq!(parse_operstate("up\n").unwrap(), OperState::Up);
        assert_eq!(parse_operstate("  down").unwrap(), OperState::Down);
        assert_eq!(parse_operstate("lowerlayerdown\n").unwrap(), OperState::Down);
        assert!(matches!(
            parse_operstate("bash: syntax error"),
            Err(DeviceError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn strip_command_echo() {
        let output = "cat /sys/class/net/eth1/operstate\nup\nroot@lhost1:~# ";
        assert_eq!(strip_echo(output, "cat /sys/class/net/eth1/operstate"), "up");
        assert_eq!(strip_echo("root@lhost1:~# ", "ip link set dev eth1 up"), "");
    }

    #[test]
    fn ip_link_output() {
        let port = PortId::from("eth7");
        assert!(check_ip_link("\n", &port).is_ok());
        assert!(matches!(
            check_ip_link("Cannot find device \"eth7\"", &port),
            Err(DeviceError::UnknownPort(_))
        ));
        assert!(matches!(
            check_ip_link("RTNETLINK answers: Operation not permitted", &port),
            Err(DeviceError::Rejected { .. })
        ));
    }

    #[test]
    fn character_split_over_packets() {
        let re = Regex::new(PROMPT_RE).unwrap();
        let output = "Grüße\r\nroot@lhost1:~# ".as_bytes();
        // the first packet ends in the middle of `ü`
        let split = 3;
        assert!(str::from_utf8(&output[..split]).is_err());
        assert_eq!(until_prompt(&re, &output[..split]).unwrap(), None);
        assert_eq!(
            until_prompt(&re, output).unwrap(),
            Some("Grüße\nroot@lhost1:~# ".to_string())
        );
        assert!(matches!(
            until_prompt(&re, b"\xff\xfe root@lhost1:~# "),
            Err(DeviceError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn prompt() {
        let re = Regex::new(PROMPT_RE).unwrap();
        assert!(re.is_match("up\nroot@lhost1:~# "));
        assert!(re.is_match("cumulus@sw1:~$ "));
        assert!(!re.is_match("root@lhost1:~# cat /sys/class/net/eth1/operstate"));
    }
}
