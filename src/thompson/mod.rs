/*! A compiler based on [Thompson's construction][1] and the Pike VM that
runs its output, as described in Russ Cox's article
[Regular Expression Matching: the Virtual Machine Approach][2].

[1]: https://en.wikipedia.org/wiki/Thompson%27s_construction
[2]: https://swtch.com/~rsc/regexp/regexp2.html
*/

pub mod bytecode;
pub mod pike_vm;
