// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! The three process-creation strategies.
//!
//! Each one launches the target program and hands back the child pid
//! without waiting for it. Reaping is the timing loop's job.
//!
//! The duplicate-based strategies never let the child branch return: it
//! either replaces its image or writes a fixed diagnostic and `_exit`s.
//!
//! The lightweight duplicate is `clone(CLONE_VM | CLONE_VFORK)`: the child
//! shares the parent's memory and the parent is suspended until the child
//! execs or exits. The child runs on its own stack buffer owned by the
//! parent's frame, and does nothing but `execvp` and `_exit` with strings
//! prepared beforehand.

use std::ffi::c_char;
use std::ptr;

use nix::errno::Errno;
use nix::unistd::{fork, ForkResult, Pid};

use crate::error::LaunchError;
use crate::types::{Strategy, TargetProgram};

extern "C" {
    static environ: *const *mut c_char;
}

/// Stack for the address-space-sharing child. Only execvp's own frames
/// (PATH search included) ever live on it.
const CHILD_STACK_SIZE: usize = 64 * 1024;

#[repr(C, align(16))]
struct ChildStack([u8; CHILD_STACK_SIZE]);

/// Diagnostic written by a child whose image replacement failed.
const EXEC_FAILED_MSG: &[u8] = b"error: execvp: failed to replace process image\n";

/// Capability shared by everything the timing loop can measure.
pub trait Launcher {
    /// Start one process running `target` and return its pid.
    fn launch(&self, target: &TargetProgram) -> Result<Pid, LaunchError>;
}

impl Launcher for Strategy {
    fn launch(&self, target: &TargetProgram) -> Result<Pid, LaunchError> {
        match self {
            Strategy::PosixSpawn => posix_spawn(target),
            Strategy::ForkExec => fork_exec(target),
            Strategy::VforkExec => vfork_exec(target),
        }
    }
}

/// Single create-and-load call. argv is just the program path and the
/// caller's environment is passed through.
fn posix_spawn(target: &TargetProgram) -> Result<Pid, LaunchError> {
    let path = target.c_path();
    let argv: [*mut c_char; 2] = [path.as_ptr() as *mut c_char, ptr::null_mut()];
    let mut pid: libc::pid_t = 0;

    // SAFETY: path and argv are NUL-terminated and outlive the call,
    // environ is the process environment maintained by libc
    let status = unsafe {
        libc::posix_spawn(
            &mut pid,
            path.as_ptr(),
            ptr::null(),
            ptr::null(),
            argv.as_ptr(),
            environ,
        )
    };

    if status != 0 {
        return Err(LaunchError::PosixSpawn(Errno::from_raw(status)));
    }

    Ok(Pid::from_raw(pid))
}

fn fork_exec(target: &TargetProgram) -> Result<Pid, LaunchError> {
    // SAFETY: the child branch only calls async-signal-safe functions
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => Ok(child),
        Ok(ForkResult::Child) => replace_image_or_exit(target),
        Err(e) => Err(LaunchError::Fork(e)),
    }
}

fn vfork_exec(target: &TargetProgram) -> Result<Pid, LaunchError> {
    let mut stack = ChildStack([0; CHILD_STACK_SIZE]);
    // SAFETY: the stack buffer outlives the child's use of it because
    // CLONE_VFORK keeps us suspended until the child execs or exits
    let stack_top = unsafe { stack.0.as_mut_ptr().add(CHILD_STACK_SIZE) };
    let flags = libc::CLONE_VM | libc::CLONE_VFORK | libc::SIGCHLD;

    // SAFETY: `target` stays borrowed for the whole call; the child only
    // reads it and leaves through execvp or _exit
    let pid = unsafe {
        libc::clone(
            exec_child,
            stack_top as *mut libc::c_void,
            flags,
            target as *const TargetProgram as *mut libc::c_void,
        )
    };

    match pid {
        -1 => Err(LaunchError::Vfork(Errno::last())),
        child => Ok(Pid::from_raw(child)),
    }
}

/// Entry point of the address-space-sharing child.
extern "C" fn exec_child(arg: *mut libc::c_void) -> libc::c_int {
    // SAFETY: arg is the &TargetProgram passed to clone by vfork_exec
    let target = unsafe { &*(arg as *const TargetProgram) };
    replace_image_or_exit(target)
}

/// Child side of fork/vfork: exec the target or die.
///
/// argv[0] is the empty string and PATH is searched, as with
/// `execlp(path, "", NULL)`.
fn replace_image_or_exit(target: &TargetProgram) -> ! {
    let argv: [*const c_char; 2] = [target.c_exec_arg0().as_ptr(), ptr::null()];

    // SAFETY: pointers are valid C strings owned by the parent's `target`;
    // write and _exit are async-signal-safe
    unsafe {
        libc::execvp(target.c_path().as_ptr(), argv.as_ptr());
        libc::write(
            libc::STDERR_FILENO,
            EXEC_FAILED_MSG.as_ptr() as *const libc::c_void,
            EXEC_FAILED_MSG.len(),
        );
        libc::_exit(libc::EXIT_FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::wait::{waitpid, WaitStatus};

    fn launch_and_reap(strategy: Strategy, target: &TargetProgram) -> WaitStatus {
        let pid = strategy.launch(target).unwrap();
        assert!(pid.as_raw() > 0);
        let status = waitpid(pid, None).unwrap();
        assert_eq!(status.pid(), Some(pid));
        status
    }

    #[test]
    fn test_every_strategy_runs_target() {
        let target = TargetProgram::default();
        for strategy in Strategy::ALL {
            let status = launch_and_reap(strategy, &target);
            assert!(
                matches!(status, WaitStatus::Exited(_, 0)),
                "{} exited with {:?}",
                strategy,
                status
            );
        }
    }

    #[test]
    fn test_vfork_exec_leaves_parent_state_intact() {
        let target = TargetProgram::default();
        let before = target.clone();
        let sentinel: [u64; 4] = [0xdead_beef, 1, 2, 3];

        for _ in 0..64 {
            let status = launch_and_reap(Strategy::VforkExec, &target);
            assert!(matches!(status, WaitStatus::Exited(_, 0)));
        }

        assert_eq!(sentinel, [0xdead_beef, 1, 2, 3]);
        assert_eq!(target, before);
    }

    #[test]
    fn test_posix_spawn_missing_target_fails_in_parent() {
        let target = TargetProgram::new("/nonexistent/spawnbench-target").unwrap();
        // glibc reports exec failures of posix_spawn back to the caller
        match Strategy::PosixSpawn.launch(&target) {
            Err(LaunchError::PosixSpawn(errno)) => assert_eq!(errno, Errno::ENOENT),
            Ok(pid) => {
                let status = waitpid(pid, None).unwrap();
                assert!(matches!(status, WaitStatus::Exited(_, 127)));
            }
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_duplicate_strategies_missing_target_exit_in_child() {
        let target = TargetProgram::new("/nonexistent/spawnbench-target").unwrap();
        for strategy in [Strategy::ForkExec, Strategy::VforkExec] {
            let status = launch_and_reap(strategy, &target);
            assert!(
                matches!(status, WaitStatus::Exited(_, libc::EXIT_FAILURE)),
                "{} exited with {:?}",
                strategy,
                status
            );
        }
    }
}
